//! Catalog value types for type definitions and entity instances.
//!
//! Field names follow the catalog's v1 REST JSON so the same structs serve the
//! HTTP adapter and the in-memory catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON class tag the catalog expects on trait (tag) payloads.
pub const STRUCT_JSON_CLASS: &str = "org.apache.atlas.typesystem.json.InstanceSerialization$_Struct";

/// Name of a catalog type.
pub type TypeName = String;

/// One attribute declared by a catalog type. Carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub name: String,
    #[serde(default)]
    pub data_type_name: String,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub is_composite: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_indexable: bool,
    #[serde(default)]
    pub reverse_attribute_name: Option<String>,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, data_type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type_name: data_type_name.into(),
            multiplicity: Multiplicity::default(),
            is_composite: false,
            is_unique: false,
            is_indexable: false,
            reverse_attribute_name: None,
        }
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }
}

/// Attribute multiplicity, either a named shorthand (`required`, `optional`,
/// `collection`, `set`) or explicit bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Multiplicity {
    Named(String),
    #[serde(rename_all = "camelCase")]
    Bounds {
        lower: u32,
        upper: u32,
        #[serde(default)]
        is_unique: bool,
    },
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::Named("optional".to_string())
    }
}

/// A class type: its own attributes plus the names of the types it extends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinition {
    #[serde(default)]
    pub type_name: TypeName,
    #[serde(default)]
    pub type_description: Option<String>,
    #[serde(default)]
    pub super_types: Vec<TypeName>,
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeDefinition>,
}

impl TypeDefinition {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_super_types<I, S>(mut self, super_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TypeName>,
    {
        self.super_types = super_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attributes<I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = AttributeDefinition>,
    {
        self.attribute_definitions = attributes.into_iter().collect();
        self
    }
}

// =============================================================================
// Wire envelopes
// =============================================================================

/// Response body of `GET /api/atlas/types/{name}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesResponse {
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub definition: Option<TypesDefinition>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesDefinition {
    #[serde(default)]
    pub class_types: Vec<TypeDefinition>,
}

impl TypesResponse {
    /// The class type the response describes, if any. Only the first entry
    /// of `classTypes` is meaningful for a single-type lookup.
    pub fn into_class_type(self) -> Option<TypeDefinition> {
        self.definition?.class_types.into_iter().next()
    }
}

/// Response body of `GET /api/atlas/entities/{guid}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    pub definition: EntityInstance,
}

// =============================================================================
// Entity instances
// =============================================================================

/// Lifecycle state of an entity instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityState {
    #[default]
    Active,
    Deleted,
    StatusDeleted,
    Other(String),
}

impl EntityState {
    /// Deleted entities are shown but cannot be edited.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Deleted | Self::StatusDeleted)
    }
}

impl From<String> for EntityState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ACTIVE" => Self::Active,
            "DELETED" => Self::Deleted,
            "STATUS_DELETED" => Self::StatusDeleted,
            _ => Self::Other(s),
        }
    }
}

impl From<EntityState> for String {
    fn from(state: EntityState) -> Self {
        match state {
            EntityState::Active => "ACTIVE".to_string(),
            EntityState::Deleted => "DELETED".to_string(),
            EntityState::StatusDeleted => "STATUS_DELETED".to_string(),
            EntityState::Other(s) => s,
        }
    }
}

/// Identity block of an entity instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityId {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub state: EntityState,
    #[serde(default)]
    pub version: i64,
}

/// A trait instance attached to an entity (a tag or a taxonomy term).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitStruct {
    #[serde(default = "default_struct_json_class")]
    pub json_class: String,
    pub type_name: String,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

fn default_struct_json_class() -> String {
    STRUCT_JSON_CLASS.to_string()
}

impl TraitStruct {
    /// An empty trait struct for attaching `type_name` to an entity.
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            json_class: STRUCT_JSON_CLASS.to_string(),
            type_name: type_name.into(),
            values: BTreeMap::new(),
        }
    }
}

/// An entity instance as returned by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInstance {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub trait_names: Vec<String>,
    #[serde(default)]
    pub traits: BTreeMap<String, TraitStruct>,
}

impl EntityInstance {
    pub fn new(guid: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            id: EntityId {
                id: guid.into(),
                type_name: Some(type_name.clone()),
                state: EntityState::Active,
                version: 0,
            },
            type_name: Some(type_name),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_state(mut self, state: EntityState) -> Self {
        self.id.state = state;
        self
    }

    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.attach_trait(TraitStruct::named(name));
        self
    }

    pub fn guid(&self) -> &str {
        &self.id.id
    }

    /// Non-empty string value of an attribute, if present.
    pub fn string_value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.string_value("description")
    }

    /// Names of attached traits. `traits` wins over `traitNames` when both
    /// are set, since it carries the payload.
    pub fn assigned_trait_names(&self) -> Vec<String> {
        if !self.traits.is_empty() {
            return self.traits.keys().cloned().collect();
        }
        self.trait_names.clone()
    }

    pub fn attach_trait(&mut self, trait_struct: TraitStruct) {
        let name = trait_struct.type_name.clone();
        if !self.trait_names.contains(&name) {
            self.trait_names.push(name.clone());
        }
        self.traits.insert(name, trait_struct);
    }

    /// Detach a trait; returns false when it was not attached.
    pub fn detach_trait(&mut self, name: &str) -> bool {
        let before = self.trait_names.len();
        self.trait_names.retain(|n| n != name);
        let removed_struct = self.traits.remove(name).is_some();
        removed_struct || self.trait_names.len() != before
    }
}
