pub mod harness;
pub mod image_server;
