//! Configuration for the authorization projection module.

use serde::Deserialize;

/// Module configuration.
///
/// Read once at startup and handed to [`ResourceAuthService::new`]; it is
/// never mutated afterwards.
///
/// [`ResourceAuthService::new`]: crate::ResourceAuthService::new
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthzProjectionConfig {
    /// Register model attributes as individual resources.
    ///
    /// When disabled, attribute writes are not sent to the policy engine and
    /// attribute checks fall back to an `update` check on the owning model.
    pub register_model_attribute: bool,

    /// Skip the policy engine for read actions on classifications.
    pub skip_read_authorization: bool,
}

impl Default for AuthzProjectionConfig {
    fn default() -> Self {
        Self {
            register_model_attribute: true,
            skip_read_authorization: false,
        }
    }
}
