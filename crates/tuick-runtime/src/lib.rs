//! # tuick-runtime
//!
//! The orchestration core: the checker runner, the finder and watcher
//! drivers, and the session controller that ties them together for the
//! lifetime of one `tuick` invocation.
//!
//! ```text
//!   checker (piped child) ──blocks──▶ session controller ──▶ finder (child)
//!                                          ▲
//!                             control endpoint (tuick-control)
//!                                  reload requests
//! ```

pub mod checker;
pub mod controller;
pub mod finder;
pub mod generation;
pub mod watcher;

pub use checker::CheckerRun;
pub use controller::{SessionController, SessionState, checker_command_for};
pub use finder::FinderDriver;
pub use generation::GenerationTracker;
pub use watcher::WatcherDriver;
