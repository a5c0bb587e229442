use serde::{Deserialize, Serialize};

/// Supplier account used when the caller did not carry one.
pub const DEFAULT_SUPPLIER_ACCOUNT: &str = "0";

/// Identity of the caller on whose behalf an operation runs.
///
/// Extracted from request metadata by the serving layer and passed
/// explicitly into every operation. Nothing in this workspace reads
/// identity from ambient state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    user: String,
    supplier_account: String,
}

impl SecurityContext {
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Name of the acting user.
    #[inline]
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Owner (supplier) account stamped onto every resource descriptor.
    #[inline]
    #[must_use]
    pub fn supplier_account(&self) -> &str {
        &self.supplier_account
    }
}

#[derive(Debug, Default)]
pub struct SecurityContextBuilder {
    user: Option<String>,
    supplier_account: Option<String>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn supplier_account(mut self, account: impl Into<String>) -> Self {
        self.supplier_account = Some(account.into());
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            user: self.user.unwrap_or_default(),
            supplier_account: self
                .supplier_account
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| DEFAULT_SUPPLIER_ACCOUNT.to_owned()),
        }
    }
}
