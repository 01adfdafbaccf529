//! Shared fixtures for smashpass-ui integration tests

pub mod image_server;

pub use image_server::{ImageServer, PNG_BYTES};
