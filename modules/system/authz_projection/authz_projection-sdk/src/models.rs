//! Domain models for the authorization projection module.
//!
//! Entity types mirror the stored record layout; descriptor and grant types
//! mirror what the policy engine accepts and returns.

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Label key carrying the owning business of an entity.
pub const LABEL_BUSINESS_ID: &str = "bk_biz_id";

/// Business id of the tenant-independent ("global") scope.
pub const GLOBAL_BUSINESS_ID: i64 = 0;

// ── Store tables ────────────────────────────────────────────────────

/// Backing-store table an entity is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    ObjectAttribute,
    Object,
    ObjectClassification,
    OperationLog,
}

impl TableKind {
    #[must_use]
    pub fn table_name(self) -> &'static str {
        match self {
            Self::ObjectAttribute => "cc_ObjAttDes",
            Self::Object => "cc_ObjDes",
            Self::ObjectClassification => "cc_ObjClassification",
            Self::OperationLog => "cc_OperationLog",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// An entity that can be decoded from a raw store record.
pub trait StoredEntity: DeserializeOwned + Send {
    /// Table the entity lives in.
    const TABLE: TableKind;
}

// ── Entities ────────────────────────────────────────────────────────

/// Free-form entity metadata. Only the label map is interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub label: BTreeMap<String, String>,
}

impl Metadata {
    /// Metadata labelled with the given business.
    #[must_use]
    pub fn for_business(business_id: i64) -> Self {
        let mut label = BTreeMap::new();
        label.insert(LABEL_BUSINESS_ID.to_owned(), business_id.to_string());
        Self { label }
    }

    /// The business label, `None` when the label is absent.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the label is present but not an integer.
    pub fn business_id(&self) -> Result<Option<i64>, ParseIntError> {
        self.label
            .get(LABEL_BUSINESS_ID)
            .map(|raw| raw.trim().parse::<i64>())
            .transpose()
    }
}

/// A model (object type), e.g. `host`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: i64,
    #[serde(rename = "bk_obj_id")]
    pub object_id: String,
    #[serde(rename = "bk_obj_name", default)]
    pub name: String,
    #[serde(rename = "bk_classification_id")]
    pub classification_id: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl StoredEntity for Object {
    const TABLE: TableKind = TableKind::Object;
}

/// A model attribute (property definition) owned by a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i64,
    #[serde(rename = "bk_obj_id")]
    pub object_id: String,
    #[serde(rename = "bk_property_id", default)]
    pub property_id: String,
    #[serde(rename = "bk_property_name", default)]
    pub property_name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl StoredEntity for Attribute {
    const TABLE: TableKind = TableKind::ObjectAttribute;
}

/// A model classification, grouping models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub id: i64,
    #[serde(rename = "bk_classification_id")]
    pub classification_id: String,
    #[serde(rename = "bk_classification_name", default)]
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl StoredEntity for Classification {
    const TABLE: TableKind = TableKind::ObjectClassification;
}

/// An audit-log category: the model a set of audit records targets.
///
/// Decoded from operation-log records; `model_id` is filled in once the
/// target model has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCategory {
    #[serde(rename = "op_target")]
    pub target: String,
    #[serde(rename = "bk_biz_id", default)]
    pub business_id: i64,
    #[serde(skip_deserializing)]
    pub model_id: i64,
}

impl StoredEntity for AuditCategory {
    const TABLE: TableKind = TableKind::OperationLog;
}

/// Result of collecting audit categories for one business.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditCategoryCollection {
    /// Valid, deduplicated categories with their model resolved.
    pub categories: Vec<AuditCategory>,
    /// Audit records that could not be decoded and were skipped.
    pub skipped: usize,
}

// ── Resource descriptors ────────────────────────────────────────────

/// Kind of an authorizable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ModelClassification,
    Model,
    ModelAttribute,
    AuditLog,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelClassification => "model_classification",
            Self::Model => "model",
            Self::ModelAttribute => "model_attribute",
            Self::AuditLog => "audit_log",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action a descriptor is built for.
///
/// `Empty` is used for registration bookkeeping where no action applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[serde(rename = "")]
    Empty,
    Find,
    FindMany,
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Find => "find",
            Self::FindMany => "find_many",
            Self::Create => "create",
            Self::CreateMany => "create_many",
            Self::Update => "update",
            Self::UpdateMany => "update_many",
            Self::Delete => "delete",
            Self::DeleteMany => "delete_many",
        }
    }

    #[must_use]
    pub fn is_read(self) -> bool {
        matches!(self, Self::Find | Self::FindMany)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ancestor in a descriptor's resource path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLayer {
    pub kind: ResourceKind,
    pub name: String,
    pub instance_id: i64,
}

/// A resource as submitted to or checked against the policy engine.
///
/// `layers` is ordered root to leaf and never contains the descriptor
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub action: Action,
    pub kind: ResourceKind,
    pub name: String,
    pub instance_id: i64,
    pub business_id: i64,
    #[serde(default)]
    pub layers: Vec<ParentLayer>,
    pub supplier_account: String,
}

// ── Grants ──────────────────────────────────────────────────────────

/// One node of a granted resource path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub resource_kind: String,
    pub resource_id: String,
}

/// A grant returned by the policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    /// Identity the grant was issued to.
    pub subject: String,
    /// Business the grant applies in; [`GLOBAL_BUSINESS_ID`] for all.
    pub business_id: i64,
    /// Resource path from root to leaf.
    #[serde(default)]
    pub resource_path: Vec<ResourceNode>,
}

impl GrantEntry {
    /// The granted resource itself, `None` for an empty path.
    #[must_use]
    pub fn leaf(&self) -> Option<&ResourceNode> {
        self.resource_path.last()
    }
}
