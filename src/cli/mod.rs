pub mod commands;
pub mod handlers;
pub mod repl;

pub use commands::{Cli, Commands};
