//! Entity detail page model for a metadata catalog.
//!
//! The core is [`resolver::AttributeResolver`]: given an entity's type it
//! walks the super-type tree through a [`catalog::CatalogTypeService`],
//! accumulates every inherited attribute definition and signals completion
//! exactly once when all lookups have settled. [`detail::EntityDetailPage`]
//! builds the rest of the page around it.
//!
//! ```ignore
//! use entity_detail::{catalog::HttpCatalogClient, config::CatalogConfig, detail::EntityDetailPage};
//!
//! let config = CatalogConfig::from_env()?;
//! let client = HttpCatalogClient::new(&config)?;
//! let page = EntityDetailPage::with_options(client, guid, config.resolver);
//! let model = page.load().await?;
//! ```

pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod resolver;
pub mod types;

pub use catalog::{CatalogTypeService, EntityService, HttpCatalogClient, InMemoryCatalog};
pub use config::{CatalogConfig, ResolverOptions, SuperTypePolicy};
pub use detail::{DetailPageModel, EntityDetailPage, Region};
pub use error::{CatalogError, Result};
pub use resolver::{AttributeResolver, ResolvedAttributes};
pub use types::{AttributeDefinition, EntityInstance, TypeDefinition};
