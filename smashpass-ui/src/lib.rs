//! smashpass-ui library - interactive terminal front-end
//!
//! The binary wires these pieces together; they live in a library so the
//! session logic and the input loop can be driven from tests.

pub mod app;
pub mod build_info;
pub mod commands;
pub mod render;
pub mod services;
pub mod session;

pub use app::App;
pub use commands::{parse_command, Command};
pub use session::Session;
