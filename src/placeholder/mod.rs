//! Placeholder interpolation engine.
//!
//! # Data Flow
//! ```text
//! template + RequestContext + RegexMatchContext + PathSegments
//!     → scanner.rs (find `{...}` tokens, once)
//!     → resolver.rs (one value per distinct token)
//!     → renderer.rs (splice values, then `{$N}` segments)
//!     → rendered string | PlaceholderError
//! ```
//!
//! # Design Decisions
//! - Pure functions: no caching, no I/O, inputs never mutated
//! - Compiled patterns are process-wide statics, safe for concurrent renders
//! - Bad indices in a template are errors; missing request data is not

pub mod context;
pub mod error;
pub mod renderer;
pub mod resolver;
pub mod scanner;

pub use context::{PathSegments, RegexMatchContext, RequestContext};
pub use error::PlaceholderError;
pub use renderer::render;
pub use scanner::{scan, PlaceholderToken, Sigil};
