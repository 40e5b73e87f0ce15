//! Core data model: buffer handles, events and match regions

pub mod event;
pub mod region;
