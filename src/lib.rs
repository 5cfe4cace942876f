// Library surface for headless/integration tests and reuse.
// Terminal rendering stays in the binary (main.rs, ui.rs).
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod error;
pub mod generator;
pub mod level;
pub mod pool;
pub mod puzzle;
pub mod runtime;
pub mod scores;
pub mod scoring;
pub mod session;
pub mod timer;
