//! Forwarding of descriptors and grant queries to the policy engine.

use std::sync::Arc;

use authz_projection_sdk::{
    GrantEntry, PolicyEngine, ProjectionError, ResourceDescriptor, ResourceKind, UpstreamError,
};
use cc_security::SecurityContext;

fn log_and_convert(operation: &'static str, e: UpstreamError) -> ProjectionError {
    tracing::error!(operation, error = %e, "policy engine call failed");
    ProjectionError::upstream(operation, e)
}

/// Thin wrapper over [`PolicyEngine`].
///
/// Submissions are not transactional: when `update` fails part way, the
/// descriptors already applied stay applied.
#[derive(Clone)]
pub struct AuthorizationGateway {
    engine: Arc<dyn PolicyEngine>,
}

impl AuthorizationGateway {
    #[must_use]
    pub fn new(engine: Arc<dyn PolicyEngine>) -> Self {
        Self { engine }
    }

    /// # Errors
    ///
    /// `Upstream` if the engine rejects the batch.
    pub async fn register(
        &self,
        ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), ProjectionError> {
        if resources.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = resources.len(), "registering resources");
        self.engine
            .register(ctx, resources)
            .await
            .map_err(|e| log_and_convert("register resources", e))
    }

    /// # Errors
    ///
    /// `Upstream` if the engine rejects the batch.
    pub async fn deregister(
        &self,
        ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), ProjectionError> {
        if resources.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = resources.len(), "deregistering resources");
        self.engine
            .deregister(ctx, resources)
            .await
            .map_err(|e| log_and_convert("deregister resources", e))
    }

    /// Update each descriptor in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// `Upstream` for the first descriptor the engine rejects.
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), ProjectionError> {
        for resource in resources {
            self.engine.update(ctx, resource).await.map_err(|e| {
                tracing::error!(
                    kind = %resource.kind,
                    name = %resource.name,
                    instance_id = resource.instance_id,
                    "resource update rejected"
                );
                log_and_convert("update resource", e)
            })?;
        }
        Ok(())
    }

    /// Require every descriptor to be allowed.
    ///
    /// # Errors
    ///
    /// - `Denied` for the first refused descriptor; the rest are not checked
    /// - `Upstream` if the engine call fails
    pub async fn check_access(
        &self,
        ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), ProjectionError> {
        for resource in resources {
            let allowed = self
                .engine
                .check_access(ctx, resource)
                .await
                .map_err(|e| log_and_convert("check access", e))?;
            if !allowed {
                tracing::debug!(
                    user = ctx.user(),
                    action = %resource.action,
                    kind = %resource.kind,
                    name = %resource.name,
                    "access denied"
                );
                return Err(ProjectionError::Denied {
                    action: resource.action,
                    kind: resource.kind,
                    name: resource.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// `Upstream` if the engine call fails.
    pub async fn list_authorized_tenants(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<i64>, ProjectionError> {
        self.engine
            .list_authorized_tenants(ctx)
            .await
            .map_err(|e| log_and_convert("list authorized tenants", e))
    }

    /// # Errors
    ///
    /// `Upstream` if the engine call fails.
    pub async fn list_grants(
        &self,
        ctx: &SecurityContext,
        business_id: i64,
        kind: ResourceKind,
    ) -> Result<Vec<GrantEntry>, ProjectionError> {
        self.engine
            .list_grants(ctx, business_id, kind)
            .await
            .map_err(|e| log_and_convert("list grants", e))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_support::{MockPolicyEngine, ctx};
    use authz_projection_sdk::Action;
    use tracing_test::traced_test;

    fn descriptor(name: &str, instance_id: i64) -> ResourceDescriptor {
        ResourceDescriptor {
            action: Action::Update,
            kind: ResourceKind::ModelClassification,
            name: name.to_owned(),
            instance_id,
            business_id: 0,
            layers: Vec::new(),
            supplier_account: "0".to_owned(),
        }
    }

    fn gateway(engine: MockPolicyEngine) -> (AuthorizationGateway, Arc<MockPolicyEngine>) {
        let engine = Arc::new(engine);
        (AuthorizationGateway::new(engine.clone()), engine)
    }

    #[tokio::test]
    async fn empty_batches_skip_the_engine() {
        let (gateway, engine) = gateway(MockPolicyEngine::failing());

        gateway.register(&ctx(), &[]).await.unwrap();
        gateway.deregister(&ctx(), &[]).await.unwrap();
        gateway.update(&ctx(), &[]).await.unwrap();
        gateway.check_access(&ctx(), &[]).await.unwrap();

        assert_eq!(engine.write_calls(), 0);
        assert!(engine.checked().is_empty());
    }

    #[tokio::test]
    async fn register_forwards_whole_batch() {
        let (gateway, engine) = gateway(MockPolicyEngine::new());
        let batch = vec![descriptor("infra", 10), descriptor("network", 11)];

        gateway.register(&ctx(), &batch).await.unwrap();

        assert_eq!(engine.registered(), batch);
    }

    #[tokio::test]
    async fn deregister_forwards_whole_batch() {
        let (gateway, engine) = gateway(MockPolicyEngine::new());
        let batch = vec![descriptor("infra", 10), descriptor("network", 11)];

        gateway.deregister(&ctx(), &batch).await.unwrap();

        assert_eq!(engine.deregistered(), batch);
        assert!(engine.registered().is_empty());
    }

    #[tokio::test]
    async fn update_stops_at_first_failure() {
        let (gateway, engine) = gateway(MockPolicyEngine::new().fail_update_at(1));
        let batch = vec![
            descriptor("infra", 10),
            descriptor("network", 11),
            descriptor("storage", 12),
        ];

        let err = gateway.update(&ctx(), &batch).await.unwrap_err();

        assert!(matches!(
            err,
            ProjectionError::Upstream {
                operation: "update resource",
                ..
            }
        ));
        // the first update is not rolled back, the third is never sent
        assert_eq!(engine.updated(), vec![descriptor("infra", 10)]);
    }

    #[tokio::test]
    async fn first_refusal_short_circuits() {
        let (gateway, engine) = gateway(MockPolicyEngine::new().deny("network"));
        let batch = vec![
            descriptor("infra", 10),
            descriptor("network", 11),
            descriptor("storage", 12),
        ];

        let err = gateway.check_access(&ctx(), &batch).await.unwrap_err();

        match err {
            ProjectionError::Denied { action, kind, name } => {
                assert_eq!(action, Action::Update);
                assert_eq!(kind, ResourceKind::ModelClassification);
                assert_eq!(name, "network");
            }
            other => panic!("expected Denied, got: {other}"),
        }
        assert_eq!(engine.checked().len(), 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn engine_failure_is_logged_and_wrapped() {
        let (gateway, _) = gateway(MockPolicyEngine::failing());

        let err = gateway
            .register(&ctx(), &[descriptor("infra", 10)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProjectionError::Upstream {
                operation: "register resources",
                source: UpstreamError::Internal(_),
            }
        ));
        assert!(logs_contain("policy engine call failed"));
    }
}
