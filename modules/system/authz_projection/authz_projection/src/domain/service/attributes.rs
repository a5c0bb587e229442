//! Model attribute registration and authorization.
//!
//! With `register_model_attribute` disabled the policy engine never learns
//! about individual attributes: writes are skipped and checks are answered
//! at model granularity.

use authz_projection_sdk::{Action, Attribute, ProjectionError};
use cc_security::SecurityContext;

use super::ResourceAuthService;

impl ResourceAuthService {
    fn attribute_registration_disabled(&self) -> bool {
        if self.config.register_model_attribute {
            return false;
        }
        tracing::debug!("model attribute registration disabled, skipping");
        true
    }

    /// # Errors
    ///
    /// Projection or policy-engine errors.
    #[tracing::instrument(skip_all, fields(count = attributes.len()))]
    pub async fn register_model_attributes(
        &self,
        ctx: &SecurityContext,
        attributes: &[Attribute],
    ) -> Result<(), ProjectionError> {
        if attributes.is_empty() || self.attribute_registration_disabled() {
            return Ok(());
        }
        let resources = self
            .projector
            .project_attributes(ctx, Action::Empty, attributes)
            .await?;
        self.gateway.register(ctx, &resources).await
    }

    /// # Errors
    ///
    /// Projection or policy-engine errors.
    #[tracing::instrument(skip_all, fields(count = attributes.len()))]
    pub async fn deregister_model_attributes(
        &self,
        ctx: &SecurityContext,
        attributes: &[Attribute],
    ) -> Result<(), ProjectionError> {
        if attributes.is_empty() || self.attribute_registration_disabled() {
            return Ok(());
        }
        let resources = self
            .projector
            .project_attributes(ctx, Action::Empty, attributes)
            .await?;
        self.gateway.deregister(ctx, &resources).await
    }

    /// Refresh registered attributes by registering them again.
    ///
    /// # Errors
    ///
    /// Projection or policy-engine errors.
    pub async fn update_registered_model_attributes(
        &self,
        ctx: &SecurityContext,
        attributes: &[Attribute],
    ) -> Result<(), ProjectionError> {
        self.register_model_attributes(ctx, attributes).await
    }

    /// # Errors
    ///
    /// Collector, projection or policy-engine errors.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn deregister_model_attributes_by_id(
        &self,
        ctx: &SecurityContext,
        ids: &[i64],
    ) -> Result<(), ProjectionError> {
        if ids.is_empty() || self.attribute_registration_disabled() {
            return Ok(());
        }
        let attributes = self.collector.collect_attributes_by_ids(ctx, ids).await?;
        self.deregister_model_attributes(ctx, &attributes).await
    }

    /// # Errors
    ///
    /// Collector, projection or policy-engine errors.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_registered_model_attributes_by_id(
        &self,
        ctx: &SecurityContext,
        ids: &[i64],
    ) -> Result<(), ProjectionError> {
        if ids.is_empty() || self.attribute_registration_disabled() {
            return Ok(());
        }
        let attributes = self.collector.collect_attributes_by_ids(ctx, ids).await?;
        self.update_registered_model_attributes(ctx, &attributes).await
    }

    /// Check `action` on every attribute.
    ///
    /// Without attribute registration this becomes an `update` check on the
    /// owning models.
    ///
    /// # Errors
    ///
    /// - `Denied` for the first refused attribute (or model)
    /// - collector, projection or policy-engine errors
    #[tracing::instrument(skip(self, ctx, attributes), fields(count = attributes.len()))]
    pub async fn authorize_model_attributes(
        &self,
        ctx: &SecurityContext,
        action: Action,
        attributes: &[Attribute],
    ) -> Result<(), ProjectionError> {
        if attributes.is_empty() {
            return Ok(());
        }

        if !self.config.register_model_attribute {
            let object_ids: Vec<String> =
                attributes.iter().map(|a| a.object_id.clone()).collect();
            return self
                .authorize_by_object_ids(ctx, Action::Update, &object_ids)
                .await;
        }

        let resources = self
            .projector
            .project_attributes(ctx, action, attributes)
            .await?;
        self.gateway.check_access(ctx, &resources).await
    }

    /// # Errors
    ///
    /// See [`authorize_model_attributes`](Self::authorize_model_attributes).
    #[tracing::instrument(skip(self, ctx))]
    pub async fn authorize_by_attribute_ids(
        &self,
        ctx: &SecurityContext,
        action: Action,
        ids: &[i64],
    ) -> Result<(), ProjectionError> {
        if ids.is_empty() || self.attribute_registration_disabled() {
            return Ok(());
        }
        let attributes = self.collector.collect_attributes_by_ids(ctx, ids).await?;
        self.authorize_model_attributes(ctx, action, &attributes).await
    }
}
