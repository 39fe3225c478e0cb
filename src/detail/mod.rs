//! Entity detail page model
//!
//! Headless counterpart of the catalog console's entity detail page:
//! fetches one entity, derives what the page shows (title, read-only state,
//! tag and term assignments), resolves the entity type's attribute
//! definitions and plans which child regions are instantiated.
//!
//! Rendering is left to the caller; this module only decides *what* the
//! regions are given and which catalog calls the affordances make.

mod assignment;
mod description;
mod route;

pub use assignment::{partition_assignments, Assignment, AssignmentKind, RemovalPrompt};
pub use description::DescriptionEditor;
pub use route::Route;

use crate::catalog::{CatalogTypeService, EntityService};
use crate::config::ResolverOptions;
use crate::error::{CatalogError, Result};
use crate::resolver::{AttributeResolver, ResolvedAttributes};
use crate::types::{AttributeDefinition, EntityInstance, TraitStruct};
use serde::Serialize;

/// A child region of the page and the inputs it is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "region", rename_all = "snake_case")]
pub enum Region {
    Schema {
        guid: String,
    },
    Lineage {
        guid: String,
    },
    Tags {
        guid: String,
        asset_name: String,
    },
    Terms {
        guid: String,
        asset_name: String,
    },
    /// Attribute table; planned once attribute resolution has completed.
    EntityDetail {
        attribute_defs: Vec<AttributeDefinition>,
    },
    /// Audit history; planned once attribute resolution has completed.
    Audit {
        guid: String,
        entity_name: String,
        attribute_defs: Vec<AttributeDefinition>,
    },
}

/// Everything the detail page shows for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPageModel {
    pub guid: String,
    pub type_name: Option<String>,
    pub title: String,
    pub read_only: bool,
    pub description: Option<String>,
    pub tags: Vec<Assignment>,
    pub terms: Vec<Assignment>,
    /// `None` when the entity carries no type name.
    pub attributes: Option<ResolvedAttributes>,
    pub regions: Vec<Region>,
}

impl DetailPageModel {
    pub fn region(&self, pred: impl Fn(&Region) -> bool) -> Option<&Region> {
        self.regions.iter().find(|r| pred(r))
    }

    pub fn assignment(&self, full_name: &str) -> Option<&Assignment> {
        self.tags
            .iter()
            .chain(self.terms.iter())
            .find(|a| a.full_name == full_name)
    }

    pub fn removal_prompt(&self, assignment: &Assignment) -> RemovalPrompt {
        RemovalPrompt::new(assignment, &self.title)
    }
}

/// Title shown in the page header.
///
/// `name`, else `qualifiedName`; a found name gets ` (typeName)` appended.
/// Without a name the type name is used, and without that the guid.
pub fn entity_title(entity: &EntityInstance, guid: &str) -> String {
    let name = entity
        .string_value("name")
        .or_else(|| entity.string_value("qualifiedName"));
    let type_name = entity.type_name.as_deref().filter(|t| !t.is_empty());

    match (name, type_name) {
        (Some(name), Some(type_name)) => format!("{} ({})", name, type_name),
        (Some(name), None) => name.to_string(),
        (None, Some(type_name)) => type_name.to_string(),
        (None, None) => guid.to_string(),
    }
}

pub struct EntityDetailPage<C> {
    guid: String,
    resolver: AttributeResolver<C>,
}

impl<C> EntityDetailPage<C>
where
    C: CatalogTypeService + EntityService,
{
    pub fn new(client: C, guid: impl Into<String>) -> Self {
        Self::with_options(client, guid, ResolverOptions::default())
    }

    pub fn with_options(client: C, guid: impl Into<String>, options: ResolverOptions) -> Self {
        Self {
            guid: guid.into(),
            resolver: AttributeResolver::with_options(client, options),
        }
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    fn client(&self) -> &C {
        self.resolver.service()
    }

    /// Fetch the entity and build the page model.
    #[tracing::instrument(skip(self), fields(guid = %self.guid))]
    pub async fn load(&self) -> Result<DetailPageModel> {
        let entity = self.client().get_entity(&self.guid).await?;

        let title = entity_title(&entity, &self.guid);
        let read_only = entity.id.state.is_read_only();
        let (tags, terms) = partition_assignments(entity.assigned_trait_names());
        // Tag and term regions are keyed on the guid the catalog reports.
        let region_guid = if entity.guid().is_empty() {
            self.guid.clone()
        } else {
            entity.guid().to_string()
        };

        let mut regions = vec![
            Region::Lineage {
                guid: self.guid.clone(),
            },
            Region::Schema {
                guid: self.guid.clone(),
            },
            Region::Tags {
                guid: region_guid.clone(),
                asset_name: title.clone(),
            },
            Region::Terms {
                guid: region_guid,
                asset_name: title.clone(),
            },
        ];

        let mut on_resolved = Vec::new();
        let attributes = self
            .resolver
            .resolve_with(entity.type_name.as_deref(), |defs| {
                on_resolved.push(Region::EntityDetail {
                    attribute_defs: defs.to_vec(),
                });
                on_resolved.push(Region::Audit {
                    guid: self.guid.clone(),
                    entity_name: title.clone(),
                    attribute_defs: defs.to_vec(),
                });
            })
            .await;
        regions.extend(on_resolved);

        tracing::info!(
            title = %title,
            read_only,
            tags = tags.len(),
            terms = terms.len(),
            attributes = attributes.as_ref().map(|a| a.attributes.len()).unwrap_or(0),
            "detail page loaded"
        );

        Ok(DetailPageModel {
            guid: self.guid.clone(),
            type_name: entity.type_name.clone(),
            title,
            read_only,
            description: entity.description().map(str::to_string),
            tags,
            terms,
            attributes,
            regions,
        })
    }

    /// Attach a tag, then reload.
    #[tracing::instrument(skip(self, model), fields(guid = %self.guid))]
    pub async fn add_tag(&self, model: &DetailPageModel, tag_name: &str) -> Result<DetailPageModel> {
        ensure_editable(model)?;
        let tag_name = tag_name.trim();
        if tag_name.is_empty() {
            return Err(CatalogError::InvalidInput("tag name is empty".to_string()));
        }
        self.client()
            .add_trait(&self.guid, TraitStruct::named(tag_name))
            .await?;
        tracing::info!(tag = %tag_name, "tag attached");
        self.load().await
    }

    /// Attach a taxonomy term, then reload.
    ///
    /// `term_name` is the full dotted path, e.g. `Catalog.Finance.Revenue`.
    #[tracing::instrument(skip(self, model), fields(guid = %self.guid))]
    pub async fn add_term(&self, model: &DetailPageModel, term_name: &str) -> Result<DetailPageModel> {
        ensure_editable(model)?;
        let term_name = term_name.trim();
        if term_name.is_empty() {
            return Err(CatalogError::InvalidInput("term name is empty".to_string()));
        }
        if !Assignment::classify(term_name).is_term() {
            return Err(CatalogError::InvalidInput(format!(
                "term {} is not a dotted taxonomy path",
                term_name
            )));
        }
        self.client().add_term(&self.guid, term_name).await?;
        tracing::info!(term = %term_name, "term attached");
        self.load().await
    }

    /// Detach a tag or term, then reload.
    #[tracing::instrument(skip(self, model), fields(guid = %self.guid))]
    pub async fn remove_assignment(
        &self,
        model: &DetailPageModel,
        assignment: &Assignment,
    ) -> Result<DetailPageModel> {
        ensure_editable(model)?;
        match assignment.kind {
            AssignmentKind::Tag => {
                self.client()
                    .delete_trait(&self.guid, &assignment.full_name)
                    .await?
            }
            AssignmentKind::Term => {
                self.client()
                    .delete_term(&self.guid, &assignment.full_name)
                    .await?
            }
        }
        tracing::info!(kind = %assignment.kind, name = %assignment.full_name, "assignment removed");
        self.load().await
    }
}

fn ensure_editable(model: &DetailPageModel) -> Result<()> {
    if model.read_only {
        return Err(CatalogError::InvalidInput(format!(
            "entity {} is deleted and read-only",
            model.guid
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityState;

    #[test]
    fn title_prefers_name_with_type() {
        let e = EntityInstance::new("g", "hive_table")
            .with_value("name", "sales")
            .with_value("qualifiedName", "db.sales@cl1");
        assert_eq!(entity_title(&e, "g"), "sales (hive_table)");
    }

    #[test]
    fn title_falls_back_to_qualified_name() {
        let e = EntityInstance::new("g", "hive_table").with_value("qualifiedName", "db.sales@cl1");
        assert_eq!(entity_title(&e, "g"), "db.sales@cl1 (hive_table)");
    }

    #[test]
    fn title_falls_back_to_type_then_guid() {
        let e = EntityInstance::new("g", "hive_table");
        assert_eq!(entity_title(&e, "g"), "hive_table");

        let mut untyped = EntityInstance::new("g", "");
        untyped.type_name = None;
        assert_eq!(entity_title(&untyped, "g-42"), "g-42");
    }

    #[test]
    fn read_only_model_rejects_edits() {
        let model = DetailPageModel {
            guid: "g".into(),
            type_name: None,
            title: "t".into(),
            read_only: EntityState::Deleted.is_read_only(),
            description: None,
            tags: vec![],
            terms: vec![],
            attributes: None,
            regions: vec![],
        };
        assert!(matches!(ensure_editable(&model), Err(CatalogError::InvalidInput(_))));
    }
}
