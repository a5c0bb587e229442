//! Read-path condition synthesized from grants.

use cc_security::QueryPredicate;
use cc_security::predicate::any_of;
use serde::{Deserialize, Serialize};

/// Predicates restricting audit-log queries to what the caller may see.
///
/// Predicates are OR-ed. When `has_authorization` is `false` the caller
/// holds no grant at all and must deny every row; an empty predicate list
/// never means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedCondition {
    pub predicates: Vec<QueryPredicate>,
    pub has_authorization: bool,
}

impl AuthorizedCondition {
    /// Condition admitting nothing.
    #[must_use]
    pub fn deny_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_predicates(predicates: Vec<QueryPredicate>) -> Self {
        let has_authorization = !predicates.is_empty();
        Self {
            predicates,
            has_authorization,
        }
    }

    /// Render as a store filter, `None` when every row must be denied.
    #[must_use]
    pub fn to_store_filter(&self) -> Option<serde_json::Value> {
        if !self.has_authorization {
            return None;
        }
        any_of(&self.predicates)
    }
}
