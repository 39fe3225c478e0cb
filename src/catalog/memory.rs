//! In-memory catalog with seeded types and entities, plus failure and latency
//! injection per type. Backs tests and the CLI's `--demo` mode.

use super::{CatalogTypeService, EntityService};
use crate::error::{CatalogError, Result};
use crate::types::{EntityInstance, TraitStruct, TypeDefinition};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryCatalog {
    types: RwLock<HashMap<String, TypeDefinition>>,
    entities: RwLock<HashMap<String, EntityInstance>>,
    failing: RwLock<HashSet<String>>,
    delays: RwLock<HashMap<String, Duration>>,
    fetch_log: RwLock<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight gauge when the fetch future finishes.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_type(&self, definition: TypeDefinition) {
        self.types
            .write()
            .await
            .insert(definition.type_name.clone(), definition);
    }

    pub async fn insert_entity(&self, entity: EntityInstance) {
        self.entities
            .write()
            .await
            .insert(entity.guid().to_string(), entity);
    }

    /// Make every lookup of `type_name` fail.
    pub async fn fail_type(&self, type_name: impl Into<String>) {
        self.failing.write().await.insert(type_name.into());
    }

    /// Delay every lookup of `type_name` before it settles.
    pub async fn delay_type(&self, type_name: impl Into<String>, delay: Duration) {
        self.delays.write().await.insert(type_name.into(), delay);
    }

    /// Type names in the order their lookups were issued.
    pub async fn fetch_log(&self) -> Vec<String> {
        self.fetch_log.read().await.clone()
    }

    pub async fn fetch_count(&self, type_name: &str) -> usize {
        self.fetch_log
            .read()
            .await
            .iter()
            .filter(|n| n.as_str() == type_name)
            .count()
    }

    /// Type lookups currently unsettled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously unsettled type lookups seen.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Small hierarchy used by the CLI demo mode.
    pub async fn demo() -> Self {
        use crate::types::AttributeDefinition;

        let catalog = Self::new();
        catalog
            .insert_type(
                TypeDefinition::new("Referenceable")
                    .with_attributes([AttributeDefinition::new("qualifiedName", "string")]),
            )
            .await;
        catalog
            .insert_type(
                TypeDefinition::new("Asset").with_attributes([
                    AttributeDefinition::new("name", "string"),
                    AttributeDefinition::new("description", "string"),
                    AttributeDefinition::new("owner", "string"),
                ]),
            )
            .await;
        catalog
            .insert_type(
                TypeDefinition::new("DataSet").with_super_types(["Referenceable", "Asset"]),
            )
            .await;
        catalog
            .insert_type(
                TypeDefinition::new("hive_table")
                    .with_super_types(["DataSet"])
                    .with_attributes([
                        AttributeDefinition::new("db", "hive_db"),
                        AttributeDefinition::new("columns", "array<hive_column>"),
                    ]),
            )
            .await;
        catalog
            .insert_entity(
                EntityInstance::new("demo-guid-1", "hive_table")
                    .with_value("name", "sales_daily")
                    .with_value("qualifiedName", "default.sales_daily@primary")
                    .with_value("description", "Daily sales rollup")
                    .with_trait("PII")
                    .with_trait("Finance.Revenue"),
            )
            .await;
        catalog
    }
}

#[async_trait]
impl CatalogTypeService for InMemoryCatalog {
    async fn get_type_definition(&self, type_name: &str) -> Result<TypeDefinition> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        self.fetch_log.write().await.push(type_name.to_string());

        let delay = self.delays.read().await.get(type_name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().await.contains(type_name) {
            return Err(CatalogError::Http {
                status: 500,
                body: format!("injected failure for {}", type_name),
            });
        }

        self.types
            .read()
            .await
            .get(type_name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(type_name.to_string()))
    }
}

#[async_trait]
impl EntityService for InMemoryCatalog {
    async fn get_entity(&self, guid: &str) -> Result<EntityInstance> {
        self.entities
            .read()
            .await
            .get(guid)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(guid.to_string()))
    }

    async fn add_trait(&self, guid: &str, trait_struct: TraitStruct) -> Result<()> {
        let mut entities = self.entities.write().await;
        let entity = entities
            .get_mut(guid)
            .ok_or_else(|| CatalogError::NotFound(guid.to_string()))?;
        entity.attach_trait(trait_struct);
        Ok(())
    }

    async fn delete_trait(&self, guid: &str, trait_name: &str) -> Result<()> {
        let mut entities = self.entities.write().await;
        let entity = entities
            .get_mut(guid)
            .ok_or_else(|| CatalogError::NotFound(guid.to_string()))?;
        if !entity.detach_trait(trait_name) {
            return Err(CatalogError::NotFound(format!("{}/{}", guid, trait_name)));
        }
        Ok(())
    }

    // Terms are stored as dotted traits.
    async fn add_term(&self, guid: &str, term_name: &str) -> Result<()> {
        self.add_trait(guid, TraitStruct::named(term_name)).await
    }

    async fn delete_term(&self, guid: &str, term_name: &str) -> Result<()> {
        self.delete_trait(guid, term_name).await
    }
}
