//! Model classification registration and authorization.

use authz_projection_sdk::{Action, Classification, ProjectionError, ResourceDescriptor};
use cc_security::SecurityContext;

use super::ResourceAuthService;
use crate::domain::projector::project_classifications;
use crate::domain::tenancy::resolve_tenant;

fn descriptors(
    ctx: &SecurityContext,
    action: Action,
    classifications: &[Classification],
) -> Result<Vec<ResourceDescriptor>, ProjectionError> {
    let business_id = resolve_tenant(classifications)?;
    Ok(project_classifications(ctx, action, business_id, classifications))
}

impl ResourceAuthService {
    /// # Errors
    ///
    /// Tenancy or policy-engine errors.
    #[tracing::instrument(skip_all, fields(count = classifications.len()))]
    pub async fn register_classifications(
        &self,
        ctx: &SecurityContext,
        classifications: &[Classification],
    ) -> Result<(), ProjectionError> {
        if classifications.is_empty() {
            return Ok(());
        }
        let resources = descriptors(ctx, Action::Empty, classifications)?;
        self.gateway.register(ctx, &resources).await
    }

    /// # Errors
    ///
    /// Tenancy or policy-engine errors.
    #[tracing::instrument(skip_all, fields(count = classifications.len()))]
    pub async fn deregister_classifications(
        &self,
        ctx: &SecurityContext,
        classifications: &[Classification],
    ) -> Result<(), ProjectionError> {
        if classifications.is_empty() {
            return Ok(());
        }
        let resources = descriptors(ctx, Action::Empty, classifications)?;
        self.gateway.deregister(ctx, &resources).await
    }

    /// Update each classification in turn.
    ///
    /// The first rejected update aborts the rest; earlier updates stay
    /// applied.
    ///
    /// # Errors
    ///
    /// Tenancy or policy-engine errors.
    #[tracing::instrument(skip_all, fields(count = classifications.len()))]
    pub async fn update_registered_classifications(
        &self,
        ctx: &SecurityContext,
        classifications: &[Classification],
    ) -> Result<(), ProjectionError> {
        if classifications.is_empty() {
            return Ok(());
        }
        let resources = descriptors(ctx, Action::Empty, classifications)?;
        self.gateway.update(ctx, &resources).await
    }

    /// # Errors
    ///
    /// Collector, tenancy or policy-engine errors.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_registered_classifications_by_id(
        &self,
        ctx: &SecurityContext,
        classification_ids: &[String],
    ) -> Result<(), ProjectionError> {
        if classification_ids.is_empty() {
            return Ok(());
        }
        let classifications = self
            .collector
            .collect_classifications_by_classification_ids(ctx, classification_ids)
            .await?;
        self.update_registered_classifications(ctx, &classifications)
            .await
    }

    /// # Errors
    ///
    /// Collector, tenancy or policy-engine errors.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_registered_classifications_by_raw_id(
        &self,
        ctx: &SecurityContext,
        ids: &[i64],
    ) -> Result<(), ProjectionError> {
        if ids.is_empty() {
            return Ok(());
        }
        let classifications = self
            .collector
            .collect_classifications_by_raw_ids(ctx, ids)
            .await?;
        self.update_registered_classifications(ctx, &classifications)
            .await
    }

    /// # Errors
    ///
    /// Collector, tenancy or policy-engine errors.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn deregister_classifications_by_raw_id(
        &self,
        ctx: &SecurityContext,
        ids: &[i64],
    ) -> Result<(), ProjectionError> {
        if ids.is_empty() {
            return Ok(());
        }
        let classifications = self
            .collector
            .collect_classifications_by_raw_ids(ctx, ids)
            .await?;
        self.deregister_classifications(ctx, &classifications).await
    }

    /// Check `action` on every classification.
    ///
    /// Read actions always succeed when `skip_read_authorization` is set.
    ///
    /// # Errors
    ///
    /// - `Denied` for the first refused classification
    /// - tenancy or policy-engine errors
    #[tracing::instrument(skip(self, ctx, classifications), fields(count = classifications.len()))]
    pub async fn authorize_by_classifications(
        &self,
        ctx: &SecurityContext,
        action: Action,
        classifications: &[Classification],
    ) -> Result<(), ProjectionError> {
        if self.config.skip_read_authorization && action.is_read() {
            tracing::debug!("read authorization skipped for classifications");
            return Ok(());
        }
        if classifications.is_empty() {
            return Ok(());
        }
        let resources = descriptors(ctx, action, classifications)?;
        self.gateway.check_access(ctx, &resources).await
    }
}
