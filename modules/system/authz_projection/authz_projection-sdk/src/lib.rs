//! Authorization projection SDK
//!
//! Public contract of the `authz_projection` module:
//!
//! - [`EntityStore`], [`PolicyEngine`] - collaborator traits
//! - [`ResourceDescriptor`], [`ParentLayer`] - what gets registered or checked
//! - [`GrantEntry`] - what the policy engine grants back
//! - [`AuthorizedCondition`] - read-path predicates synthesized from grants
//! - [`ProjectionError`], [`UpstreamError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use authz_projection_sdk::{Action, AuthorizedCondition};
//!
//! let condition: AuthorizedCondition = service
//!     .make_authorized_audit_list_condition(&ctx, business_id)
//!     .await?;
//!
//! match condition.to_store_filter() {
//!     Some(filter) => audit_log.find(filter).await?,
//!     None => Vec::new(), // no grant anywhere: deny all
//! }
//! ```

pub mod api;
pub mod condition;
pub mod error;
pub mod models;

pub use api::{EntityStore, PolicyEngine};
pub use condition::AuthorizedCondition;
pub use error::{ProjectionError, UpstreamError};
pub use models::{
    Action, Attribute, AuditCategory, AuditCategoryCollection, Classification, GrantEntry,
    Metadata, Object, ParentLayer, ResourceDescriptor, ResourceKind, ResourceNode, StoredEntity,
    TableKind,
};
