//! Catalog loading
//!
//! The catalog is the fixed, ordered list of entities the user pages through.
//! Order is the position in the source JSON array and drives previous/next
//! navigation as well as the CSV row order.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Catalog JSON compiled into the binary (first-generation Pokemon)
const BUNDLED_CATALOG: &str = include_str!("../resources/pokemons.json");

/// One catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Zero-padded identifier ("001"), used as the verdict key
    pub id: String,
    /// Lowercase name as published by the source API
    pub name: String,
    /// High quality artwork shown for the entity
    #[serde(rename = "image_hq")]
    pub image_url: String,
    /// Smaller detail image, not required
    #[serde(default)]
    pub image: Option<String>,
    /// Free-form type information, carried through untouched
    #[serde(default)]
    pub types: serde_json::Value,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: image_url.into(),
            image: None,
            types: serde_json::Value::Null,
        }
    }

    /// Name with its first character upper-cased ("bulbasaur" -> "Bulbasaur")
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Immutable ordered entity list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entities: Vec<Entity>,
}

impl Catalog {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Empty catalog used when startup is allowed to degrade
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the catalog embedded at compile time
    pub fn bundled() -> Result<Self> {
        let catalog = Self::from_json_str(BUNDLED_CATALOG)?;
        info!(entities = catalog.len(), "Loaded bundled catalog");
        Ok(catalog)
    }

    /// Read a catalog JSON file from disk
    ///
    /// Any read failure (missing file, permissions, bad UTF-8) is reported as
    /// `CatalogUnavailable`, same as a parse failure.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::CatalogUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json_str(&content).map_err(|e| match e {
            Error::CatalogUnavailable(reason) => {
                Error::CatalogUnavailable(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;
        info!(path = %path.display(), entities = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// Parse a JSON array of `{id, name, image_hq, image, types}` objects
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entities: Vec<Entity> = serde_json::from_str(json)
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;
        debug!(entities = entities.len(), "Parsed catalog JSON");
        Ok(Self { entities })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity at a 0-based position, `None` when out of range
    pub fn get(&self, position: usize) -> Option<&Entity> {
        self.entities.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Position of the first entity with this id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// First entity whose name matches exactly
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
