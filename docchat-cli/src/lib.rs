//! # docchat-cli
//!
//! The `docchat` launcher: a chat REPL, an explicit index rebuild, and a
//! one-shot search, all configured by flags with `DOCCHAT_*` environment
//! fallbacks.

pub mod app;
pub mod cli;
pub mod repl;
pub mod telemetry;

pub use app::execute;
pub use cli::{Cli, Commands, Options};
pub use telemetry::init_telemetry;
