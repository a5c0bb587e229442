//! Authorization Projection Module
//!
//! Projects configuration entities (model attributes, models, model
//! classifications, audit categories) into resource descriptors for the
//! policy engine, and turns the caller's audit-log grants back into store
//! predicates.
//!
//! The module provides [`ResourceAuthService`], built from an
//! [`EntityStore`](authz_projection_sdk::EntityStore), a
//! [`PolicyEngine`](authz_projection_sdk::PolicyEngine) and an
//! [`AuthzProjectionConfig`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

#[cfg(test)]
mod test_support;

pub use config::AuthzProjectionConfig;
pub use domain::ResourceAuthService;
