//! Projection of configuration entities into resource descriptors.
//!
//! A descriptor carries the full ancestor chain of its entity, root first:
//!
//! ```text
//! model_classification(infra, 10) -> model(host, 5) -> model_attribute(Host name, 1)
//!        layer                         layer              leaf (descriptor)
//! ```

use std::collections::HashMap;

use authz_projection_sdk::{
    Action, Attribute, AuditCategory, Classification, Object, ParentLayer, ProjectionError,
    ResourceDescriptor, ResourceKind,
};
use cc_security::SecurityContext;
use cc_security::predicate::fields;

use super::collector::EntityCollector;
use super::tenancy::resolve_tenant;

#[derive(Clone)]
pub struct ResourceProjector {
    collector: EntityCollector,
}

impl ResourceProjector {
    #[must_use]
    pub fn new(collector: EntityCollector) -> Self {
        Self { collector }
    }

    /// One descriptor per attribute, in input order.
    ///
    /// # Errors
    ///
    /// - collector errors while resolving the owning models
    /// - `InconsistentTenant` if the owning models span businesses
    /// - `MissingRelation` if a model's classification does not exist
    pub async fn project_attributes(
        &self,
        ctx: &SecurityContext,
        action: Action,
        attributes: &[Attribute],
    ) -> Result<Vec<ResourceDescriptor>, ProjectionError> {
        if attributes.is_empty() {
            return Ok(Vec::new());
        }

        let object_ids: Vec<String> = attributes.iter().map(|a| a.object_id.clone()).collect();
        let models = self
            .collector
            .collect_objects_by_object_ids(ctx, &object_ids)
            .await?;
        let business_id = resolve_tenant(&models)?;
        let classification_layers = self.classification_layers(ctx, &models).await?;
        let models: HashMap<&str, &Object> =
            models.iter().map(|m| (m.object_id.as_str(), m)).collect();

        attributes
            .iter()
            .map(|attribute| {
                let model = models.get(attribute.object_id.as_str()).ok_or_else(|| {
                    ProjectionError::MissingRelation {
                        relation: "model",
                        key: attribute.object_id.clone(),
                    }
                })?;
                let classification = layer_for(&classification_layers, model)?;

                Ok(ResourceDescriptor {
                    action,
                    kind: ResourceKind::ModelAttribute,
                    name: attribute.property_name.clone(),
                    instance_id: attribute.id,
                    business_id,
                    layers: vec![classification, model_layer(model)],
                    supplier_account: ctx.supplier_account().to_owned(),
                })
            })
            .collect()
    }

    /// One descriptor per model, in input order.
    ///
    /// # Errors
    ///
    /// - `InconsistentTenant` if the models span businesses
    /// - `MissingRelation` if a model's classification does not exist
    pub async fn project_models(
        &self,
        ctx: &SecurityContext,
        action: Action,
        models: &[Object],
    ) -> Result<Vec<ResourceDescriptor>, ProjectionError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let business_id = resolve_tenant(models)?;
        let classification_layers = self.classification_layers(ctx, models).await?;

        models
            .iter()
            .map(|model| {
                Ok(ResourceDescriptor {
                    action,
                    kind: ResourceKind::Model,
                    name: model.object_id.clone(),
                    instance_id: model.id,
                    business_id,
                    layers: vec![layer_for(&classification_layers, model)?],
                    supplier_account: ctx.supplier_account().to_owned(),
                })
            })
            .collect()
    }

    /// Classification layer per classification id referenced by `models`.
    async fn classification_layers(
        &self,
        ctx: &SecurityContext,
        models: &[Object],
    ) -> Result<HashMap<String, ParentLayer>, ProjectionError> {
        let classification_ids: Vec<String> = models
            .iter()
            .map(|m| m.classification_id.clone())
            .collect();
        let classifications: Vec<Classification> = self
            .collector
            .lookup_by_ids(ctx, fields::CLASSIFICATION_ID, &classification_ids)
            .await?;

        Ok(classifications
            .into_iter()
            .map(|c| {
                let layer = ParentLayer {
                    kind: ResourceKind::ModelClassification,
                    name: c.classification_id.clone(),
                    instance_id: c.id,
                };
                (c.classification_id, layer)
            })
            .collect())
    }
}

/// Classifications are roots: no layers.
#[must_use]
pub fn project_classifications(
    ctx: &SecurityContext,
    action: Action,
    business_id: i64,
    classifications: &[Classification],
) -> Vec<ResourceDescriptor> {
    classifications
        .iter()
        .map(|classification| ResourceDescriptor {
            action,
            kind: ResourceKind::ModelClassification,
            name: classification.classification_id.clone(),
            instance_id: classification.id,
            business_id,
            layers: Vec::new(),
            supplier_account: ctx.supplier_account().to_owned(),
        })
        .collect()
}

/// Audit categories are keyed by their target model's raw id.
#[must_use]
pub fn project_audit_categories(
    ctx: &SecurityContext,
    action: Action,
    business_id: i64,
    categories: &[AuditCategory],
) -> Vec<ResourceDescriptor> {
    categories
        .iter()
        .map(|category| ResourceDescriptor {
            action,
            kind: ResourceKind::AuditLog,
            name: category.target.clone(),
            instance_id: category.model_id,
            business_id,
            layers: Vec::new(),
            supplier_account: ctx.supplier_account().to_owned(),
        })
        .collect()
}

fn layer_for(
    layers: &HashMap<String, ParentLayer>,
    model: &Object,
) -> Result<ParentLayer, ProjectionError> {
    layers
        .get(&model.classification_id)
        .cloned()
        .ok_or_else(|| {
            tracing::error!(
                model = %model.object_id,
                classification = %model.classification_id,
                "model references a missing classification"
            );
            ProjectionError::MissingRelation {
                relation: "classification",
                key: model.classification_id.clone(),
            }
        })
}

fn model_layer(model: &Object) -> ParentLayer {
    ParentLayer {
        kind: ResourceKind::Model,
        name: model.object_id.clone(),
        instance_id: model.id,
    }
}
