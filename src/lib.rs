// Library surface for headless/integration tests and reuse.
// The TUI harness (main.rs, ui.rs) stays in the binary.
pub mod clock;
pub mod coins;
pub mod config;
pub mod format;
pub mod rates;
pub mod runtime;
pub mod schedule;
pub mod session;
pub mod sink;
