//! Batched entity lookups against the backing store.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use authz_projection_sdk::{
    Attribute, Classification, EntityStore, Object, ProjectionError, StoredEntity, TableKind,
};
use cc_security::predicate::fields;
use cc_security::{QueryPredicate, SecurityContext};
use serde_json::Value;

/// Fetches typed entities by identifier set.
///
/// Identifiers are deduplicated before the lookup so that a result count
/// different from the request count reliably signals a stale or invalid
/// identifier.
#[derive(Clone)]
pub struct EntityCollector {
    store: Arc<dyn EntityStore>,
}

impl EntityCollector {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Fetch exactly one `T` per distinct identifier, matched on `field`.
    ///
    /// Empty input returns an empty vector without calling the store.
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing matched
    /// - `CountMismatch` if the match count differs from the distinct id count
    /// - `Parse` if any record fails to decode (no partial result)
    /// - `Upstream` if the store call fails
    pub async fn fetch_by_ids<T, V>(
        &self,
        ctx: &SecurityContext,
        field: &str,
        ids: &[V],
    ) -> Result<Vec<T>, ProjectionError>
    where
        T: StoredEntity,
        V: Clone + Eq + Hash + Into<Value>,
    {
        let ids = unique_values(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.fetch_in::<T>(ctx, field, &ids).await?;
        if records.is_empty() {
            return Err(ProjectionError::NotFound {
                table: T::TABLE,
                ids: render_ids(&ids),
            });
        }
        if records.len() != ids.len() {
            return Err(ProjectionError::CountMismatch {
                table: T::TABLE,
                ids: render_ids(&ids),
                expected: ids.len(),
                found: records.len(),
            });
        }

        decode_all(records)
    }

    /// Like [`fetch_by_ids`](Self::fetch_by_ids) but without the count check.
    ///
    /// For relation lookups where the caller reports what is missing.
    pub(crate) async fn lookup_by_ids<T, V>(
        &self,
        ctx: &SecurityContext,
        field: &str,
        ids: &[V],
    ) -> Result<Vec<T>, ProjectionError>
    where
        T: StoredEntity,
        V: Clone + Eq + Hash + Into<Value>,
    {
        let ids = unique_values(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = self.fetch_in::<T>(ctx, field, &ids).await?;
        decode_all(records)
    }

    /// Raw records of `table` matching `filter`, undecoded.
    pub(crate) async fn fetch_records(
        &self,
        ctx: &SecurityContext,
        table: TableKind,
        filter: &QueryPredicate,
    ) -> Result<Vec<Value>, ProjectionError> {
        self.store
            .fetch_by_filter(ctx, table, filter)
            .await
            .map_err(|e| {
                tracing::error!(table = %table, error = %e, "entity store call failed");
                ProjectionError::upstream("fetch entities", e)
            })
    }

    async fn fetch_in<T: StoredEntity>(
        &self,
        ctx: &SecurityContext,
        field: &str,
        ids: &[Value],
    ) -> Result<Vec<Value>, ProjectionError> {
        let filter = QueryPredicate::new().field_in(field, ids.iter().cloned());
        self.fetch_records(ctx, T::TABLE, &filter).await
    }

    // ── Typed lookups ───────────────────────────────────────────────

    /// # Errors
    ///
    /// See [`fetch_by_ids`](Self::fetch_by_ids).
    pub async fn collect_attributes_by_ids(
        &self,
        ctx: &SecurityContext,
        ids: &[i64],
    ) -> Result<Vec<Attribute>, ProjectionError> {
        self.fetch_by_ids(ctx, fields::ID, ids).await
    }

    /// # Errors
    ///
    /// See [`fetch_by_ids`](Self::fetch_by_ids).
    pub async fn collect_objects_by_object_ids(
        &self,
        ctx: &SecurityContext,
        object_ids: &[String],
    ) -> Result<Vec<Object>, ProjectionError> {
        self.fetch_by_ids(ctx, fields::OBJECT_ID, object_ids).await
    }

    /// # Errors
    ///
    /// See [`fetch_by_ids`](Self::fetch_by_ids).
    pub async fn collect_objects_by_raw_ids(
        &self,
        ctx: &SecurityContext,
        ids: &[i64],
    ) -> Result<Vec<Object>, ProjectionError> {
        self.fetch_by_ids(ctx, fields::ID, ids).await
    }

    /// # Errors
    ///
    /// See [`fetch_by_ids`](Self::fetch_by_ids).
    pub async fn collect_classifications_by_classification_ids(
        &self,
        ctx: &SecurityContext,
        classification_ids: &[String],
    ) -> Result<Vec<Classification>, ProjectionError> {
        self.fetch_by_ids(ctx, fields::CLASSIFICATION_ID, classification_ids)
            .await
    }

    /// # Errors
    ///
    /// See [`fetch_by_ids`](Self::fetch_by_ids).
    pub async fn collect_classifications_by_raw_ids(
        &self,
        ctx: &SecurityContext,
        ids: &[i64],
    ) -> Result<Vec<Classification>, ProjectionError> {
        self.fetch_by_ids(ctx, fields::ID, ids).await
    }
}

/// Distinct ids in first-seen order.
fn unique_values<V>(ids: &[V]) -> Vec<Value>
where
    V: Clone + Eq + Hash + Into<Value>,
{
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(*id))
        .map(|id| id.clone().into())
        .collect()
}

fn render_ids(ids: &[Value]) -> String {
    let parts: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn decode_all<T: StoredEntity>(records: Vec<Value>) -> Result<Vec<T>, ProjectionError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value::<T>(record).map_err(|e| {
                tracing::error!(table = %T::TABLE, error = %e, "failed to decode stored record");
                ProjectionError::parse(T::TABLE.table_name(), e)
            })
        })
        .collect()
}
