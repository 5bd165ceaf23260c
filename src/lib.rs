// Library surface for headless/integration tests and reuse.
// Terminal setup and CLI parsing stay in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod enrich;
pub mod logging;
pub mod runtime;
pub mod seed;
pub mod session;
pub mod ui;
pub mod util;
pub mod verb;
