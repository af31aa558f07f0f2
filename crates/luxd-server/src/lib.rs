// luxd — local backlight control over sysfs

//! HTTP boundary for luxd: CLI, router assembly, and route handlers over
//! the core device layer.

pub mod cli;
pub mod routes;
pub mod server;

pub use cli::Cli;
pub use routes::ApiError;
pub use server::{create_router, run, AppState};
