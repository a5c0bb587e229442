//! Security kernel shared by the authorization modules.
//!
//! - [`SecurityContext`] - explicit caller identity
//! - [`predicate`] - store-level filter predicates built from grants

pub mod predicate;
pub mod security_context;

pub use predicate::{FieldFilter, FilterOp, QueryPredicate};
pub use security_context::{SecurityContext, SecurityContextBuilder};
