//! Error types for the authorization projection module.

use thiserror::Error;

use crate::models::{Action, ResourceKind, TableKind};

/// Failure reported by a collaborator (entity store or policy engine).
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The collaborator is not reachable or not ready.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The caller's request was cancelled before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// Any other collaborator failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by projection, tenancy and synthesis operations.
///
/// Every variant carries enough context (table, identifiers, tenant) to
/// diagnose the failure without retrying.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// None of the requested identifiers resolved.
    #[error("get {table} by {ids} failed, not found")]
    NotFound { table: TableKind, ids: String },

    /// Some requested identifiers did not resolve, or resolved ambiguously.
    #[error("get {table} by {ids} failed, get {found}, expect {expected}")]
    CountMismatch {
        table: TableKind,
        ids: String,
        expected: usize,
        found: usize,
    },

    /// A stored record or grant could not be decoded.
    ///
    /// `source_kind` names what was being decoded: a store table or a
    /// policy-engine payload.
    #[error("parse {source_kind} failed: {reason}")]
    Parse {
        source_kind: &'static str,
        reason: String,
    },

    /// A batch spans more than one business.
    #[error("get multiple business ID from entities: {expected} and {found}")]
    InconsistentTenant { expected: i64, found: i64 },

    /// A required parent entity could not be resolved.
    #[error("{relation} {key} not found")]
    MissingRelation { relation: &'static str, key: String },

    /// The policy engine refused a read-path check.
    #[error("{action} on {kind} {name} denied")]
    Denied {
        action: Action,
        kind: ResourceKind,
        name: String,
    },

    /// A collaborator call failed.
    #[error("{operation} failed: {source}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl ProjectionError {
    #[must_use]
    pub fn upstream(operation: &'static str, source: UpstreamError) -> Self {
        Self::Upstream { operation, source }
    }

    #[must_use]
    pub fn parse(source_kind: &'static str, reason: impl ToString) -> Self {
        Self::Parse {
            source_kind,
            reason: reason.to_string(),
        }
    }
}
