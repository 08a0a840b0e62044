//! Placeholder-driven HTTP redirect service.
//!
//! The core is [`placeholder`]: it renders destination templates such as
//! `https://{label2}.example.org{uri}` from an inbound request plus capture
//! context supplied by the rule lookup.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod placeholder;
pub mod routing;

pub use config::RedirectConfig;
pub use http::RedirectServer;
pub use lifecycle::Shutdown;
pub use placeholder::{render, PathSegments, PlaceholderError, RegexMatchContext, RequestContext};
