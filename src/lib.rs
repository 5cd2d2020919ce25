// Library surface for headless/integration tests and reuse.
// The ui module stays bin-only since it renders the App in main.rs.
pub mod config;
pub mod game;
pub mod report;
pub mod runtime;
pub mod scenario;
pub mod scoring;
