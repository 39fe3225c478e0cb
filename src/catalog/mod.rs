//! Catalog ports: the only boundary between the page model and the catalog service.
//!
//! - `CatalogTypeService`: type-definition lookups used by the attribute resolver
//! - `EntityService`: entity fetch and tag/term assignment
//!
//! Two adapters: `HttpCatalogClient` (REST v1) and `InMemoryCatalog`.

pub mod http;
pub mod memory;

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalog;

use crate::error::Result;
use crate::types::{EntityInstance, TraitStruct, TypeDefinition};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CatalogTypeService: Send + Sync {
    /// Fetch one type's definition. One call per invocation, no batching.
    async fn get_type_definition(&self, type_name: &str) -> Result<TypeDefinition>;
}

#[async_trait]
pub trait EntityService: Send + Sync {
    async fn get_entity(&self, guid: &str) -> Result<EntityInstance>;

    /// Attach a tag (trait) to an entity.
    async fn add_trait(&self, guid: &str, trait_struct: TraitStruct) -> Result<()>;

    /// Detach a tag (trait) from an entity.
    async fn delete_trait(&self, guid: &str, trait_name: &str) -> Result<()>;

    /// Attach a taxonomy term (dotted path) to an entity.
    async fn add_term(&self, guid: &str, term_name: &str) -> Result<()>;

    /// Detach a taxonomy term from an entity.
    async fn delete_term(&self, guid: &str, term_name: &str) -> Result<()>;
}

#[async_trait]
impl<T: CatalogTypeService + ?Sized> CatalogTypeService for Arc<T> {
    async fn get_type_definition(&self, type_name: &str) -> Result<TypeDefinition> {
        (**self).get_type_definition(type_name).await
    }
}

#[async_trait]
impl<T: EntityService + ?Sized> EntityService for Arc<T> {
    async fn get_entity(&self, guid: &str) -> Result<EntityInstance> {
        (**self).get_entity(guid).await
    }

    async fn add_trait(&self, guid: &str, trait_struct: TraitStruct) -> Result<()> {
        (**self).add_trait(guid, trait_struct).await
    }

    async fn delete_trait(&self, guid: &str, trait_name: &str) -> Result<()> {
        (**self).delete_trait(guid, trait_name).await
    }

    async fn add_term(&self, guid: &str, term_name: &str) -> Result<()> {
        (**self).add_term(guid, term_name).await
    }

    async fn delete_term(&self, guid: &str, term_name: &str) -> Result<()> {
        (**self).delete_term(guid, term_name).await
    }
}
