//! Service facade over the projection components.
//!
//! Operations are grouped by entity kind:
//! - [`attributes`] - model attributes, honoring `register_model_attribute`
//! - [`models`] - model-level checks
//! - [`classifications`] - model classifications, honoring `skip_read_authorization`
//! - [`audit`] - audit categories and the audit-log read condition

pub mod attributes;
pub mod audit;
pub mod classifications;
pub mod models;

use std::sync::Arc;

use authz_projection_sdk::{EntityStore, PolicyEngine};

use super::collector::EntityCollector;
use super::gateway::AuthorizationGateway;
use super::projector::ResourceProjector;
use super::synthesizer::ConditionSynthesizer;
use crate::config::AuthzProjectionConfig;

/// Keeps the policy engine's resource registry in step with configuration
/// entities and answers authorization questions about them.
///
/// Holds only shared collaborators and immutable config, so it can be
/// cloned into as many tasks as needed.
#[derive(Clone)]
pub struct ResourceAuthService {
    config: AuthzProjectionConfig,
    collector: EntityCollector,
    projector: ResourceProjector,
    gateway: AuthorizationGateway,
    synthesizer: ConditionSynthesizer,
}

impl ResourceAuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        engine: Arc<dyn PolicyEngine>,
        config: AuthzProjectionConfig,
    ) -> Self {
        let collector = EntityCollector::new(store);
        let gateway = AuthorizationGateway::new(engine);
        Self {
            config,
            projector: ResourceProjector::new(collector.clone()),
            synthesizer: ConditionSynthesizer::new(collector.clone(), gateway.clone()),
            collector,
            gateway,
        }
    }
}
