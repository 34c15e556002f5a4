use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const EMBEDDED_MENU: &str = include_str!("../data/menu.json");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: String,
}

/// The menu for one kiosk session. Order is significant: it breaks ties
/// between equally good name matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Result<Self> {
        validate(&items)?;
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn validate(items: &[CatalogItem]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if item.id.trim().is_empty() {
            return Err(Error::Catalog(format!("item {:?} has an empty id", item.name)));
        }
        if item.name.trim().is_empty() {
            return Err(Error::Catalog(format!("item {} has an empty name", item.id)));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(Error::Catalog(format!(
                "item {} has an invalid price {}",
                item.id, item.price
            )));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(Error::Catalog(format!("duplicate item id {}", item.id)));
        }
    }
    Ok(())
}

pub fn from_json(contents: &str) -> Result<Catalog> {
    let items = serde_json::from_str::<Vec<CatalogItem>>(contents)?;
    Catalog::new(items)
}

pub fn load(path: &Path) -> Result<Catalog> {
    let contents = fs::read_to_string(path)?;
    from_json(&contents)
}

pub fn default_catalog() -> Catalog {
    from_json(EMBEDDED_MENU).expect("embedded menu.json must be a valid catalog")
}
