//! Synthesis of audit-log read conditions from policy-engine grants.

use std::collections::{BTreeMap, HashSet};

use authz_projection_sdk::models::GLOBAL_BUSINESS_ID;
use authz_projection_sdk::{AuthorizedCondition, GrantEntry, ProjectionError, ResourceKind};
use cc_security::predicate::fields;
use cc_security::{QueryPredicate, SecurityContext};

use super::collector::EntityCollector;
use super::gateway::AuthorizationGateway;

/// Turns the caller's `audit_log` grants into OR-ed store predicates.
///
/// Grants in the global business admit their models in every business;
/// grants in business `N` admit their models only where `bk_biz_id == N`.
#[derive(Clone)]
pub struct ConditionSynthesizer {
    collector: EntityCollector,
    gateway: AuthorizationGateway,
}

impl ConditionSynthesizer {
    #[must_use]
    pub fn new(collector: EntityCollector, gateway: AuthorizationGateway) -> Self {
        Self { collector, gateway }
    }

    /// Build the condition for `business_id`, or for every authorized
    /// business when it is the global id.
    ///
    /// The global predicate, if any, comes first; per-business predicates
    /// follow in ascending business order.
    ///
    /// # Errors
    ///
    /// - `Parse` if a granted leaf id is not an integer
    /// - collector errors if a granted model cannot be resolved
    /// - `Upstream` if the policy engine fails
    pub async fn synthesize(
        &self,
        ctx: &SecurityContext,
        business_id: i64,
    ) -> Result<AuthorizedCondition, ProjectionError> {
        let tenants = self.candidate_tenants(ctx, business_id).await?;

        let mut targets: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for tenant in tenants {
            let grants = self
                .gateway
                .list_grants(ctx, tenant, ResourceKind::AuditLog)
                .await?;
            let model_ids = granted_model_ids(&grants)?;
            if model_ids.is_empty() {
                continue;
            }

            let models = self
                .collector
                .collect_objects_by_raw_ids(ctx, &model_ids)
                .await?;
            let object_ids: Vec<String> = models.into_iter().map(|m| m.object_id).collect();
            if !object_ids.is_empty() {
                targets.insert(tenant, object_ids);
            }
        }

        let mut predicates = Vec::with_capacity(targets.len());
        if let Some(global) = targets.remove(&GLOBAL_BUSINESS_ID) {
            predicates.push(QueryPredicate::new().field_in(fields::OP_TARGET, global));
        }
        for (tenant, object_ids) in targets {
            predicates.push(
                QueryPredicate::new()
                    .field_in(fields::OP_TARGET, object_ids)
                    .field_eq(fields::BUSINESS_ID, tenant),
            );
        }

        tracing::debug!(
            user = ctx.user(),
            business_id,
            predicates = predicates.len(),
            "synthesized audit log condition"
        );
        Ok(AuthorizedCondition::from_predicates(predicates))
    }

    /// Requested (or authorized) businesses, distinct, global last.
    async fn candidate_tenants(
        &self,
        ctx: &SecurityContext,
        business_id: i64,
    ) -> Result<Vec<i64>, ProjectionError> {
        let requested = if business_id == GLOBAL_BUSINESS_ID {
            self.gateway.list_authorized_tenants(ctx).await?
        } else {
            vec![business_id]
        };

        let mut seen = HashSet::with_capacity(requested.len() + 1);
        let mut tenants: Vec<i64> = requested
            .into_iter()
            .filter(|tenant| *tenant != GLOBAL_BUSINESS_ID && seen.insert(*tenant))
            .collect();
        tenants.push(GLOBAL_BUSINESS_ID);
        Ok(tenants)
    }
}

/// Raw model ids named by the leaf of each non-empty grant path.
fn granted_model_ids(grants: &[GrantEntry]) -> Result<Vec<i64>, ProjectionError> {
    grants
        .iter()
        .filter_map(GrantEntry::leaf)
        .map(|leaf| {
            leaf.resource_id.parse::<i64>().map_err(|e| {
                tracing::error!(
                    resource_id = %leaf.resource_id,
                    error = %e,
                    "granted audit resource id is not an integer"
                );
                ProjectionError::parse("grant", e)
            })
        })
        .collect()
}
