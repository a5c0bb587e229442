//! Domain layer for the authorization projection module.

pub mod collector;
pub mod gateway;
pub mod projector;
pub mod service;
pub mod synthesizer;
pub mod tenancy;

pub use collector::EntityCollector;
pub use gateway::AuthorizationGateway;
pub use projector::ResourceProjector;
pub use service::ResourceAuthService;
pub use synthesizer::ConditionSynthesizer;
pub use tenancy::{TenantScoped, resolve_tenant};
