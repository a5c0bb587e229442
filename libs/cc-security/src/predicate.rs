use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store field names shared by the collectors and the condition synthesizer.
pub mod fields {
    /// Raw (numeric) primary key of any stored entity.
    pub const ID: &str = "id";

    /// Business (tenant) identifier.
    pub const BUSINESS_ID: &str = "bk_biz_id";

    /// External model identifier, e.g. `"host"`.
    pub const OBJECT_ID: &str = "bk_obj_id";

    /// External classification identifier, e.g. `"infra"`.
    pub const CLASSIFICATION_ID: &str = "bk_classification_id";

    /// Model an audit log record was written against.
    pub const OP_TARGET: &str = "op_target";
}

/// Operation of a single field filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// `field == value`
    Eq,
    /// `field IN (values)`
    In,
}

impl FilterOp {
    fn operator(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::In => "$in",
        }
    }
}

/// A condition on one store field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    field: String,
    op: FilterOp,
    values: Vec<Value>,
}

impl FieldFilter {
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            values: vec![value.into()],
        }
    }

    #[must_use]
    pub fn is_in<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::In,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[inline]
    #[must_use]
    pub fn op(&self) -> FilterOp {
        self.op
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn operand(&self) -> Value {
        match self.op {
            FilterOp::Eq => self.values.first().cloned().unwrap_or(Value::Null),
            FilterOp::In => Value::Array(self.values.clone()),
        }
    }
}

/// A conjunction (AND) of field filters.
///
/// Used both as the lookup filter handed to the entity store and as one
/// access path of a synthesized read condition. When several predicates are
/// combined they are OR-ed by the consuming store.
///
/// ```
/// use cc_security::predicate::{QueryPredicate, fields};
///
/// let predicate = QueryPredicate::new()
///     .field_in(fields::OP_TARGET, ["host", "module"])
///     .field_eq(fields::BUSINESS_ID, 2);
///
/// assert_eq!(
///     predicate.to_json(),
///     serde_json::json!({
///         "op_target": {"$in": ["host", "module"]},
///         "bk_biz_id": {"$eq": 2}
///     })
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPredicate {
    filters: Vec<FieldFilter>,
}

impl QueryPredicate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`, replacing any earlier filter on `field`.
    #[must_use]
    pub fn field_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_filter(FieldFilter::eq(field, value))
    }

    /// Require `field IN values`, replacing any earlier filter on `field`.
    #[must_use]
    pub fn field_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.with_filter(FieldFilter::is_in(field, values))
    }

    fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.filters.retain(|f| f.field != filter.field);
        self.filters.push(filter);
        self
    }

    /// The filters in this predicate (AND-ed together).
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Find the filter on `field`, if any.
    #[must_use]
    pub fn filter_for(&self, field: &str) -> Option<&FieldFilter> {
        self.filters.iter().find(|f| f.field() == field)
    }

    /// Render in the store's condition format.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.filters.len());
        for filter in &self.filters {
            let mut cond = Map::with_capacity(1);
            cond.insert(filter.op().operator().to_owned(), filter.operand());
            map.insert(filter.field().to_owned(), Value::Object(cond));
        }
        Value::Object(map)
    }
}

/// Render a disjunction of predicates as `{"$or": [...]}`.
///
/// Returns `None` for an empty slice: an empty disjunction matches nothing,
/// and the store has no way to express that as a filter.
#[must_use]
pub fn any_of(predicates: &[QueryPredicate]) -> Option<Value> {
    if predicates.is_empty() {
        return None;
    }
    let alternatives = predicates.iter().map(QueryPredicate::to_json).collect();
    let mut map = Map::with_capacity(1);
    map.insert("$or".to_owned(), Value::Array(alternatives));
    Some(Value::Object(map))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_filter_renders_single_operand() {
        let predicate = QueryPredicate::new().field_eq(fields::BUSINESS_ID, 7);
        assert_eq!(predicate.to_json(), json!({"bk_biz_id": {"$eq": 7}}));
    }

    #[test]
    fn in_filter_keeps_value_order() {
        let predicate = QueryPredicate::new().field_in(fields::ID, [3_i64, 1, 2]);
        assert_eq!(predicate.to_json(), json!({"id": {"$in": [3, 1, 2]}}));
    }

    #[test]
    fn empty_predicate_renders_empty_object() {
        let predicate = QueryPredicate::new();
        assert!(predicate.is_empty());
        assert_eq!(predicate.to_json(), json!({}));
    }

    #[test]
    fn later_filter_on_same_field_replaces_earlier() {
        let predicate = QueryPredicate::new()
            .field_eq(fields::BUSINESS_ID, 1)
            .field_in(fields::OP_TARGET, ["host"])
            .field_eq(fields::BUSINESS_ID, 2);

        assert_eq!(predicate.filters().len(), 2);
        assert_eq!(
            predicate.filter_for(fields::BUSINESS_ID).map(FieldFilter::values),
            Some(&[json!(2)][..])
        );
        assert_eq!(
            predicate.to_json(),
            json!({"op_target": {"$in": ["host"]}, "bk_biz_id": {"$eq": 2}})
        );
    }

    #[test]
    fn any_of_wraps_alternatives() {
        let predicates = vec![
            QueryPredicate::new().field_in(fields::OP_TARGET, ["host"]),
            QueryPredicate::new()
                .field_in(fields::OP_TARGET, ["set"])
                .field_eq(fields::BUSINESS_ID, 3),
        ];

        assert_eq!(
            any_of(&predicates),
            Some(json!({"$or": [
                {"op_target": {"$in": ["host"]}},
                {"op_target": {"$in": ["set"]}, "bk_biz_id": {"$eq": 3}}
            ]}))
        );
    }

    #[test]
    fn any_of_empty_is_none() {
        assert_eq!(any_of(&[]), None);
    }
}
