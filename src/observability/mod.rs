//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (request_id, rule, error)
//!
//! Consumers:
//!     → logging.rs subscriber → stdout | stderr | file | discarded
//! ```
//!
//! # Design Decisions
//! - Request ID flows through handler logs
//! - The placeholder core only logs at trace level

pub mod logging;

pub use logging::{init_logging, LogOutput, LoggingError};
