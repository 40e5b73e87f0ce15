//! Services: scanning, hover resolution and their I/O seams

pub mod highlight;
pub mod hover;
pub mod image_loader;
pub mod scan_worker;
