//! Ingredient and sandwich records.
//!
//! Write-side types (`New*`, `*Update`) are validated at the boundary and converted into store
//! documents here. Read-side types (`*Record`) are built tolerantly from whatever the store
//! holds: absent or mistyped fields fall back to an empty string, an empty list, or `true` for
//! availability.

use crate::CatalogResult;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use psb_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A new ingredient, before the store assigns it an identifier.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewIngredient {
    pub name: NonEmptyText,
    /// Kind of ingredient, e.g. "bread" or "cheese".
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defaults to available when omitted.
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl NewIngredient {
    pub(crate) fn into_document(self) -> Document {
        doc! {
            "name": self.name.into_inner(),
            "type": self.kind,
            "description": self.description,
            "tags": self.tags,
            "is_available": self.is_available.unwrap_or(true),
        }
    }
}

/// One entry of a sandwich's ingredient list.
///
/// `ingredient_id` points at an ingredient record. Any other keys (a quantity, a note) are
/// stored and returned as given.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IngredientRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IngredientRef {
    /// An entry holding only an ingredient identifier.
    pub fn new(ingredient_id: impl Into<String>) -> Self {
        Self {
            ingredient_id: Some(ingredient_id.into()),
            extra: Map::new(),
        }
    }

    fn to_bson(&self) -> CatalogResult<Bson> {
        let mut entry = Document::new();
        if let Some(ingredient_id) = &self.ingredient_id {
            entry.insert("ingredient_id", coerce_identifier(ingredient_id));
        }
        for (key, value) in &self.extra {
            entry.insert(key.clone(), mongodb::bson::to_bson(value)?);
        }
        Ok(Bson::Document(entry))
    }

    fn from_bson_document(entry: &Document) -> Self {
        let mut ingredient_ref = Self::default();
        for (key, value) in entry {
            if key == "ingredient_id" {
                ingredient_ref.ingredient_id = Some(identifier_text(value));
            } else {
                ingredient_ref
                    .extra
                    .insert(key.clone(), value.clone().into_relaxed_extjson());
            }
        }
        ingredient_ref
    }
}

/// A new premade sandwich.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewSandwich {
    pub name: NonEmptyText,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl NewSandwich {
    pub(crate) fn into_document(self) -> CatalogResult<Document> {
        Ok(doc! {
            "name": self.name.into_inner(),
            "description": self.description,
            "ingredients": ingredient_refs_to_bson(&self.ingredients)?,
            "tags": self.tags,
            "is_available": self.is_available.unwrap_or(true),
        })
    }
}

/// Partial update of an ingredient; `None` fields are left as stored.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct IngredientUpdate {
    pub name: Option<NonEmptyText>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

impl IngredientUpdate {
    pub(crate) fn into_set_document(self) -> Document {
        let mut changes = Document::new();
        if let Some(name) = self.name {
            changes.insert("name", name.into_inner());
        }
        if let Some(kind) = self.kind {
            changes.insert("type", kind);
        }
        if let Some(description) = self.description {
            changes.insert("description", description);
        }
        if let Some(tags) = self.tags {
            changes.insert("tags", tags);
        }
        if let Some(is_available) = self.is_available {
            changes.insert("is_available", is_available);
        }
        changes
    }
}

/// Partial update of a sandwich; `None` fields are left as stored.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SandwichUpdate {
    pub name: Option<NonEmptyText>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<IngredientRef>>,
    pub tags: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

impl SandwichUpdate {
    pub(crate) fn into_set_document(self) -> CatalogResult<Document> {
        let mut changes = Document::new();
        if let Some(name) = self.name {
            changes.insert("name", name.into_inner());
        }
        if let Some(description) = self.description {
            changes.insert("description", description);
        }
        if let Some(ingredients) = self.ingredients {
            changes.insert("ingredients", ingredient_refs_to_bson(&ingredients)?);
        }
        if let Some(tags) = self.tags {
            changes.insert("tags", tags);
        }
        if let Some(is_available) = self.is_available {
            changes.insert("is_available", is_available);
        }
        Ok(changes)
    }
}

/// Convert an ingredient identifier to the store's native type when it has the right shape.
///
/// Anything that does not parse as an `ObjectId` is kept as the original string. No lookup is
/// made against the ingredient collection, so a well-formed but dangling reference is accepted.
pub fn coerce_identifier(raw: &str) -> Bson {
    match ObjectId::parse_str(raw) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => {
            tracing::debug!(ingredient_id = raw, "keeping non-ObjectId ingredient reference");
            Bson::String(raw.to_string())
        }
    }
}

fn ingredient_refs_to_bson(refs: &[IngredientRef]) -> CatalogResult<Vec<Bson>> {
    refs.iter().map(IngredientRef::to_bson).collect()
}

// ============================================================================
// READ SIDE
// ============================================================================

/// An ingredient as held by the store.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct IngredientRecord {
    /// Identifier assigned by the store.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub tags: Vec<String>,
    pub is_available: bool,
}

impl IngredientRecord {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: id_field(document),
            name: text_field(document, "name"),
            kind: text_field(document, "type"),
            description: text_field(document, "description"),
            tags: tags_field(document, "tags"),
            is_available: document.get_bool("is_available").unwrap_or(true),
        }
    }
}

/// A premade sandwich as held by the store.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SandwichRecord {
    /// Identifier assigned by the store.
    pub id: String,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<IngredientRef>,
    pub tags: Vec<String>,
    pub is_available: bool,
}

impl SandwichRecord {
    pub fn from_document(document: &Document) -> Self {
        let ingredients = document
            .get_array("ingredients")
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item.as_document() {
                        Some(entry) => Some(IngredientRef::from_bson_document(entry)),
                        None => {
                            tracing::debug!(entry = %item, "skipping non-object ingredient entry");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: id_field(document),
            name: text_field(document, "name"),
            description: text_field(document, "description"),
            ingredients,
            tags: tags_field(document, "tags"),
            is_available: document.get_bool("is_available").unwrap_or(true),
        }
    }
}

fn identifier_text(value: &Bson) -> String {
    match value {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn id_field(document: &Document) -> String {
    document.get("_id").map(identifier_text).unwrap_or_default()
}

fn text_field(document: &Document, key: &str) -> String {
    document
        .get_str(key)
        .map(str::to_string)
        .unwrap_or_default()
}

fn tags_field(document: &Document, key: &str) -> Vec<String> {
    document
        .get_array(key)
        .map(|items| {
            items
                .iter()
                .filter_map(Bson::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
