//! Routing subsystem.
//!
//! Stands in for the record lookup that picks a template: a static rule
//! table from the config file.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → router.rs (rule lookup, priority order)
//!     → matcher.rs (evaluate host / prefix conditions)
//!     → pattern captures + path segments
//!     → Return: RouteMatch or no match
//!
//! Rule Compilation (at startup and on reload):
//!     RuleConfig[]
//!     → Compile patterns and matchers
//!     → Sort by priority
//!     → Freeze as immutable RedirectTable
//! ```

pub mod matcher;
pub mod router;

pub use router::{CompiledRule, RedirectTable, RouteMatch, RoutingError};
