//! Catalog REST v1 client
//!
//! HTTP adapter for both catalog ports. Path segments are percent-encoded, so
//! type and trait names may carry dots or spaces.

use super::{CatalogTypeService, EntityService};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::types::{EntityInstance, EntityResponse, TraitStruct, TypeDefinition, TypesResponse};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use url::Url;

/// Catalog REST client
pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CatalogError::Config(format!("invalid base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Config(format!(
                "base_url cannot be a base: {}",
                config.base_url
            )));
        }

        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join percent-encoded path segments onto the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    /// Send a request and fail on non-success status.
    async fn send(&self, builder: RequestBuilder, subject: &str) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::from_status(status.as_u16(), subject, body));
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, subject: &str) -> Result<T> {
        tracing::debug!(url = %url, "catalog GET");
        let response = self.send(self.request(Method::GET, url), subject).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CatalogTypeService for HttpCatalogClient {
    async fn get_type_definition(&self, type_name: &str) -> Result<TypeDefinition> {
        let url = self.endpoint(&["api", "atlas", "types", type_name]);
        let response: TypesResponse = self.get_json(url, type_name).await?;
        match response.into_class_type() {
            Some(class_type) => Ok(class_type),
            None => {
                // Trait and struct types answer with no class type; they
                // contribute nothing.
                tracing::debug!(type_name, "type has no class definition");
                Ok(TypeDefinition::new(type_name))
            }
        }
    }
}

#[async_trait]
impl EntityService for HttpCatalogClient {
    async fn get_entity(&self, guid: &str) -> Result<EntityInstance> {
        let url = self.endpoint(&["api", "atlas", "entities", guid]);
        let response: EntityResponse = self.get_json(url, guid).await?;
        Ok(response.definition)
    }

    async fn add_trait(&self, guid: &str, trait_struct: TraitStruct) -> Result<()> {
        let url = self.endpoint(&["api", "atlas", "entities", guid, "traits"]);
        tracing::debug!(url = %url, trait_name = %trait_struct.type_name, "catalog POST trait");
        let builder = self.request(Method::POST, url).json(&trait_struct);
        self.send(builder, guid).await?;
        Ok(())
    }

    async fn delete_trait(&self, guid: &str, trait_name: &str) -> Result<()> {
        let url = self.endpoint(&["api", "atlas", "entities", guid, "traits", trait_name]);
        tracing::debug!(url = %url, "catalog DELETE trait");
        self.send(self.request(Method::DELETE, url), trait_name).await?;
        Ok(())
    }

    async fn add_term(&self, guid: &str, term_name: &str) -> Result<()> {
        let url = self.endpoint(&["api", "atlas", "v1", "entities", guid, "tags", term_name]);
        tracing::debug!(url = %url, "catalog POST term");
        self.send(self.request(Method::POST, url), term_name).await?;
        Ok(())
    }

    async fn delete_term(&self, guid: &str, term_name: &str) -> Result<()> {
        let url = self.endpoint(&["api", "atlas", "v1", "entities", guid, "tags", term_name]);
        tracing::debug!(url = %url, "catalog DELETE term");
        self.send(self.request(Method::DELETE, url), term_name).await?;
        Ok(())
    }
}
