//! Low-level primitives
//!
//! Pattern definitions and char-offset text utilities.

pub mod patterns;
