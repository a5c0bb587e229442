//! Audit categories and the audit-log read condition.

use std::collections::{HashMap, HashSet};

use authz_projection_sdk::{
    Action, AuditCategory, AuditCategoryCollection, AuthorizedCondition, Object, ProjectionError,
    TableKind,
};
use cc_security::predicate::fields;
use cc_security::{QueryPredicate, SecurityContext};

use super::ResourceAuthService;
use crate::domain::projector::project_audit_categories;
use crate::domain::tenancy::resolve_tenant;

impl ResourceAuthService {
    /// Distinct audit categories recorded for `business_id`.
    ///
    /// Log records that do not decode are skipped and counted. Categories
    /// whose target model no longer exists are dropped.
    ///
    /// # Errors
    ///
    /// `Upstream` if the store fails.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn collect_audit_categories_by_business_id(
        &self,
        ctx: &SecurityContext,
        business_id: i64,
    ) -> Result<AuditCategoryCollection, ProjectionError> {
        let filter = QueryPredicate::new().field_eq(fields::BUSINESS_ID, business_id);
        let records = self
            .collector
            .fetch_records(ctx, TableKind::OperationLog, &filter)
            .await?;

        let mut skipped = 0;
        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for record in records {
            match serde_json::from_value::<AuditCategory>(record) {
                Ok(category) => {
                    if seen.insert(category.target.clone()) {
                        categories.push(category);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "skipping malformed audit log record");
                }
            }
        }

        let targets: Vec<String> = categories.iter().map(|c| c.target.clone()).collect();
        let models: Vec<Object> = self
            .collector
            .lookup_by_ids(ctx, fields::OBJECT_ID, &targets)
            .await?;
        let model_ids: HashMap<String, i64> =
            models.into_iter().map(|m| (m.object_id, m.id)).collect();

        let categories: Vec<AuditCategory> = categories
            .into_iter()
            .filter_map(|mut category| {
                if let Some(model_id) = model_ids.get(&category.target) {
                    category.model_id = *model_id;
                    Some(category)
                } else {
                    tracing::error!(op_target = %category.target, "unexpected audit op target");
                    None
                }
            })
            .collect();

        tracing::debug!(
            categories = categories.len(),
            skipped,
            "collected audit categories"
        );
        Ok(AuditCategoryCollection {
            categories,
            skipped,
        })
    }

    /// # Errors
    ///
    /// Tenancy or policy-engine errors.
    #[tracing::instrument(skip_all, fields(count = categories.len()))]
    pub async fn register_audit_categories(
        &self,
        ctx: &SecurityContext,
        categories: &[AuditCategory],
    ) -> Result<(), ProjectionError> {
        if categories.is_empty() {
            return Ok(());
        }
        let business_id = resolve_tenant(categories)?;
        let resources = project_audit_categories(ctx, Action::Empty, business_id, categories);
        self.gateway.register(ctx, &resources).await
    }

    /// Condition limiting audit-log reads to what the caller was granted.
    ///
    /// Pass the global business id to cover every business the caller is
    /// authorized in.
    ///
    /// # Errors
    ///
    /// See [`ConditionSynthesizer::synthesize`](crate::domain::synthesizer::ConditionSynthesizer::synthesize).
    #[tracing::instrument(skip(self, ctx))]
    pub async fn make_authorized_audit_list_condition(
        &self,
        ctx: &SecurityContext,
        business_id: i64,
    ) -> Result<AuthorizedCondition, ProjectionError> {
        self.synthesizer.synthesize(ctx, business_id).await
    }
}
