//! Tenant resolution over entity batches.

use authz_projection_sdk::models::GLOBAL_BUSINESS_ID;
use authz_projection_sdk::{Attribute, AuditCategory, Classification, Object, ProjectionError};

/// An entity that belongs to exactly one business.
pub trait TenantScoped {
    /// Owning business, [`GLOBAL_BUSINESS_ID`] when unlabelled.
    ///
    /// # Errors
    ///
    /// `Parse` if the business label is present but not an integer.
    fn business_id(&self) -> Result<i64, ProjectionError>;
}

fn labelled_business(
    metadata: &authz_projection_sdk::Metadata,
    source_kind: &'static str,
) -> Result<i64, ProjectionError> {
    metadata
        .business_id()
        .map(|id| id.unwrap_or(GLOBAL_BUSINESS_ID))
        .map_err(|e| ProjectionError::parse(source_kind, e))
}

impl TenantScoped for Object {
    fn business_id(&self) -> Result<i64, ProjectionError> {
        labelled_business(&self.metadata, "model metadata")
    }
}

impl TenantScoped for Attribute {
    fn business_id(&self) -> Result<i64, ProjectionError> {
        labelled_business(&self.metadata, "model attribute metadata")
    }
}

impl TenantScoped for Classification {
    fn business_id(&self) -> Result<i64, ProjectionError> {
        labelled_business(&self.metadata, "classification metadata")
    }
}

impl TenantScoped for AuditCategory {
    fn business_id(&self) -> Result<i64, ProjectionError> {
        Ok(self.business_id)
    }
}

/// The single business shared by `entities`.
///
/// Empty input resolves to [`GLOBAL_BUSINESS_ID`].
///
/// # Errors
///
/// - `Parse` if a business label is malformed
/// - `InconsistentTenant` if two entities disagree
pub fn resolve_tenant<T: TenantScoped>(entities: &[T]) -> Result<i64, ProjectionError> {
    let mut resolved: Option<i64> = None;
    for entity in entities {
        let business_id = entity.business_id()?;
        match resolved {
            None => resolved = Some(business_id),
            Some(expected) if expected != business_id => {
                return Err(ProjectionError::InconsistentTenant {
                    expected,
                    found: business_id,
                });
            }
            Some(_) => {}
        }
    }
    Ok(resolved.unwrap_or(GLOBAL_BUSINESS_ID))
}
