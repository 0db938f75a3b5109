//! JSON payloads exchanged over `/api/v1/pubsub`.

use psb_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct HealthRes {
    pub status: String,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

/// One entry of a sandwich's `ingredients` list.
///
/// Keys other than `ingredient_id` are stored and returned as given.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientRefDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /addingredient`. Unknown keys are rejected.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddIngredientReq {
    #[schema(value_type = String, example = "Sourdough Bread")]
    pub name: NonEmptyText,
    #[serde(rename = "type", default)]
    #[schema(example = "bread")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Stored as `true` when omitted.
    #[serde(default)]
    pub is_available: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AddIngredientRes {
    pub message: String,
    pub ingredient_id: String,
}

/// Body of `POST /addsub`. Unknown keys are rejected.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddSandwichReq {
    #[schema(value_type = String, example = "Italian Sub")]
    pub name: NonEmptyText,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub ingredients: Vec<IngredientRefDto>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AddSandwichRes {
    pub message: String,
    pub sandwich_id: String,
}

/// One element of `GET /ingredients`.
///
/// `id` is the element's position in the response, not the store identifier.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IngredientView {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// One element of `GET /subs`.
///
/// `id` is the element's position in the response, not the store identifier.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SandwichView {
    pub id: String,
    pub name: String,
    pub description: String,
    #[schema(value_type = Vec<Object>)]
    pub ingredients: Vec<IngredientRefDto>,
    pub tags: Vec<String>,
}
