#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authz_projection_sdk::{
    EntityStore, GrantEntry, PolicyEngine, ResourceDescriptor, ResourceKind, ResourceNode,
    TableKind, UpstreamError,
};
use cc_security::{QueryPredicate, SecurityContext};
use serde_json::{Value, json};

use crate::config::AuthzProjectionConfig;
use crate::domain::ResourceAuthService;

#[must_use]
pub fn ctx() -> SecurityContext {
    SecurityContext::builder()
        .user("admin")
        .supplier_account("0")
        .build()
}

/// Store holding records per table and answering `$eq`/`$in` filters.
#[derive(Default)]
pub struct InMemoryStore {
    tables: HashMap<TableKind, Vec<Value>>,
    fail: bool,
    calls: Mutex<Vec<(TableKind, QueryPredicate)>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_records(mut self, table: TableKind, records: Vec<Value>) -> Self {
        self.tables.entry(table).or_default().extend(records);
        self
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(TableKind, QueryPredicate)> {
        self.calls.lock().unwrap().clone()
    }
}

fn matches(record: &Value, predicate: &QueryPredicate) -> bool {
    predicate
        .filters()
        .iter()
        .all(|f| record.get(f.field()).is_some_and(|v| f.values().contains(v)))
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn fetch_by_filter(
        &self,
        _ctx: &SecurityContext,
        table: TableKind,
        filter: &QueryPredicate,
    ) -> Result<Vec<Value>, UpstreamError> {
        self.calls.lock().unwrap().push((table, filter.clone()));
        if self.fail {
            return Err(UpstreamError::ServiceUnavailable("coreservice".to_owned()));
        }
        Ok(self
            .tables
            .get(&table)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches(r, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Policy engine that records every submission.
#[derive(Default)]
pub struct MockPolicyEngine {
    registered: Mutex<Vec<ResourceDescriptor>>,
    deregistered: Mutex<Vec<ResourceDescriptor>>,
    updated: Mutex<Vec<ResourceDescriptor>>,
    checked: Mutex<Vec<ResourceDescriptor>>,
    denied_names: HashSet<String>,
    tenants: Vec<i64>,
    grants: HashMap<i64, Vec<GrantEntry>>,
    fail_update_at: Option<usize>,
    fail: bool,
}

impl MockPolicyEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Refuse `check_access` for resources with this display name.
    #[must_use]
    pub fn deny(mut self, name: &str) -> Self {
        self.denied_names.insert(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_tenants(mut self, tenants: Vec<i64>) -> Self {
        self.tenants = tenants;
        self
    }

    /// Grant the leaf ids in `business_id`, one single-node path each.
    #[must_use]
    pub fn grant(mut self, business_id: i64, leaf_ids: &[&str]) -> Self {
        let entries = leaf_ids.iter().map(|id| GrantEntry {
            subject: "admin".to_owned(),
            business_id,
            resource_path: vec![ResourceNode {
                resource_kind: ResourceKind::AuditLog.as_str().to_owned(),
                resource_id: (*id).to_owned(),
            }],
        });
        self.grants.entry(business_id).or_default().extend(entries);
        self
    }

    #[must_use]
    pub fn with_grant_entries(mut self, business_id: i64, entries: Vec<GrantEntry>) -> Self {
        self.grants.entry(business_id).or_default().extend(entries);
        self
    }

    /// Fail the `n`-th (zero based) `update` call.
    #[must_use]
    pub fn fail_update_at(mut self, n: usize) -> Self {
        self.fail_update_at = Some(n);
        self
    }

    pub fn registered(&self) -> Vec<ResourceDescriptor> {
        self.registered.lock().unwrap().clone()
    }

    pub fn deregistered(&self) -> Vec<ResourceDescriptor> {
        self.deregistered.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<ResourceDescriptor> {
        self.updated.lock().unwrap().clone()
    }

    pub fn checked(&self) -> Vec<ResourceDescriptor> {
        self.checked.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> usize {
        self.registered().len() + self.deregistered().len() + self.updated().len()
    }

    fn check_failure(&self) -> Result<(), UpstreamError> {
        if self.fail {
            return Err(UpstreamError::Internal("iam down".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyEngine for MockPolicyEngine {
    async fn register(
        &self,
        _ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), UpstreamError> {
        self.check_failure()?;
        self.registered.lock().unwrap().extend_from_slice(resources);
        Ok(())
    }

    async fn deregister(
        &self,
        _ctx: &SecurityContext,
        resources: &[ResourceDescriptor],
    ) -> Result<(), UpstreamError> {
        self.check_failure()?;
        self.deregistered.lock().unwrap().extend_from_slice(resources);
        Ok(())
    }

    async fn update(
        &self,
        _ctx: &SecurityContext,
        resource: &ResourceDescriptor,
    ) -> Result<(), UpstreamError> {
        self.check_failure()?;
        let mut updated = self.updated.lock().unwrap();
        if self.fail_update_at == Some(updated.len()) {
            return Err(UpstreamError::Internal("update rejected".to_owned()));
        }
        updated.push(resource.clone());
        Ok(())
    }

    async fn check_access(
        &self,
        _ctx: &SecurityContext,
        resource: &ResourceDescriptor,
    ) -> Result<bool, UpstreamError> {
        self.check_failure()?;
        self.checked.lock().unwrap().push(resource.clone());
        Ok(!self.denied_names.contains(&resource.name))
    }

    async fn list_authorized_tenants(
        &self,
        _ctx: &SecurityContext,
    ) -> Result<Vec<i64>, UpstreamError> {
        self.check_failure()?;
        Ok(self.tenants.clone())
    }

    async fn list_grants(
        &self,
        _ctx: &SecurityContext,
        business_id: i64,
        _kind: ResourceKind,
    ) -> Result<Vec<GrantEntry>, UpstreamError> {
        self.check_failure()?;
        Ok(self.grants.get(&business_id).cloned().unwrap_or_default())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn classification_record(id: i64, classification_id: &str) -> Value {
    json!({
        "id": id,
        "bk_classification_id": classification_id,
        "bk_classification_name": classification_id,
    })
}

pub fn object_record(id: i64, object_id: &str, classification_id: &str) -> Value {
    json!({
        "id": id,
        "bk_obj_id": object_id,
        "bk_obj_name": object_id,
        "bk_classification_id": classification_id,
    })
}

pub fn attribute_record(id: i64, object_id: &str, property_name: &str) -> Value {
    json!({
        "id": id,
        "bk_obj_id": object_id,
        "bk_property_id": property_name,
        "bk_property_name": property_name,
    })
}

pub fn with_business(mut record: Value, business_id: i64) -> Value {
    record["metadata"] = json!({"label": {"bk_biz_id": business_id.to_string()}});
    record
}

/// Classification `infra` (10) holding models `host` (5) and `set` (6);
/// `host` owns attributes 1 and 2, `set` owns attribute 3.
#[must_use]
pub fn seeded_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_records(
            TableKind::ObjectClassification,
            vec![
                classification_record(10, "infra"),
                classification_record(11, "network"),
            ],
        )
        .with_records(
            TableKind::Object,
            vec![
                object_record(5, "host", "infra"),
                object_record(6, "set", "infra"),
                object_record(7, "switch", "network"),
            ],
        )
        .with_records(
            TableKind::ObjectAttribute,
            vec![
                attribute_record(1, "host", "Host name"),
                attribute_record(2, "host", "Inner IP"),
                attribute_record(3, "set", "Set name"),
            ],
        )
}

pub fn build_service(
    store: InMemoryStore,
    engine: MockPolicyEngine,
    config: AuthzProjectionConfig,
) -> (ResourceAuthService, Arc<InMemoryStore>, Arc<MockPolicyEngine>) {
    let store = Arc::new(store);
    let engine = Arc::new(engine);
    let service = ResourceAuthService::new(store.clone(), engine.clone(), config);
    (service, store, engine)
}
