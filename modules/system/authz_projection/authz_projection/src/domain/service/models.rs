use authz_projection_sdk::{Action, ProjectionError};
use cc_security::SecurityContext;

use super::ResourceAuthService;

impl ResourceAuthService {
    /// Check `action` on the models named by `object_ids`.
    ///
    /// # Errors
    ///
    /// - `Denied` for the first refused model
    /// - collector, projection or policy-engine errors
    #[tracing::instrument(skip(self, ctx))]
    pub async fn authorize_by_object_ids(
        &self,
        ctx: &SecurityContext,
        action: Action,
        object_ids: &[String],
    ) -> Result<(), ProjectionError> {
        if object_ids.is_empty() {
            return Ok(());
        }
        let models = self
            .collector
            .collect_objects_by_object_ids(ctx, object_ids)
            .await?;
        let resources = self.projector.project_models(ctx, action, &models).await?;
        self.gateway.check_access(ctx, &resources).await
    }
}
