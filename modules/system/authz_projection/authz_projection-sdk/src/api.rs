//! Collaborator traits consumed by the projection layer.
//!
//! Both traits are implemented outside this workspace (store client, IAM
//! client) and injected as `Arc<dyn ...>`. The caller's [`SecurityContext`]
//! is passed through to every call.

use async_trait::async_trait;
use cc_security::{QueryPredicate, SecurityContext};

use crate::error::UpstreamError;
use crate::models::{GrantEntry, ResourceDescriptor, ResourceKind, TableKind};

/// Read access to the document store holding configuration entities.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Return the raw records of `table` matching `filter`.
    ///
    /// No ordering is guaranteed beyond stable-as-stored.
    ///
    /// # Errors
    ///
    /// Any transport or store failure.
    async fn fetch_by_filter(
        &self,
        ctx: &SecurityContext,
        table: TableKind,
        filter: &QueryPredicate,
    ) -> Result<Vec<serde_json::Value>, UpstreamError>;
}

/// The external policy-decision service.
#[async_trait]
pub trait PolicyEngine: Send + Sync {
    /// Register resources so that permissions can be granted on them.
    ///
    /// # Errors
    ///
    /// Any engine failure. Resources accepted before the failure stay
    /// registered.
    async fn register(
        &self,
        ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), UpstreamError>;

    /// Remove previously registered resources.
    ///
    /// # Errors
    ///
    /// Any engine failure.
    async fn deregister(
        &self,
        ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), UpstreamError>;

    /// Update the display data of one registered resource.
    ///
    /// # Errors
    ///
    /// Any engine failure.
    async fn update(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
    ) -> Result<(), UpstreamError>;

    /// Ask whether the caller may perform `resource.action` on `resource`.
    ///
    /// # Errors
    ///
    /// Any engine failure. A refusal is `Ok(false)`, not an error.
    async fn check_access(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
    ) -> Result<bool, UpstreamError>;

    /// Businesses in which the caller holds any permission.
    ///
    /// # Errors
    ///
    /// Any engine failure.
    async fn list_authorized_tenants(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<i64>, UpstreamError>;

    /// Grants the caller holds on `kind` within `business_id`.
    ///
    /// # Errors
    ///
    /// Any engine failure.
    async fn list_grants(
        &self,
        ctx: &SecurityContext,
        business_id: i64,
        kind: ResourceKind,
    ) -> Result<Vec<GrantEntry>, UpstreamError>;
}
