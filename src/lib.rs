// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod daily_reset;
pub mod error;
pub mod logging;
pub mod record;
pub mod runtime;
pub mod session;
pub mod store;
pub mod timer;

pub use error::{Result, ZenError};
