//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     load config → init logging → bind listener → serve
//!
//! Shutdown:
//!     signals.rs (SIGTERM / Ctrl+C)
//!     → shutdown.rs trigger
//!     → server stops accepting, drains in-flight requests
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::wait_for_signal;
