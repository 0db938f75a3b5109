//! # PSB Core
//!
//! Core business logic for the premade sandwich catalogue.
//!
//! This crate contains pure data operations:
//! - Ingredient and sandwich records, and their conversion to and from store documents
//! - The document store client (MongoDB, or an in-memory store for development)
//! - Services that list, add, update and delete records
//!
//! **No API concerns**: HTTP routing, request/response shaping and the command-line interface
//! belong in `api-rest`, `api-shared` and `psb-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod repositories;
pub mod store;

pub use config::{CoreConfig, StoreBackend, StoreConfig};
pub use error::{CatalogError, CatalogResult};
pub use models::{
    IngredientRecord, IngredientRef, IngredientUpdate, NewIngredient, NewSandwich,
    SandwichRecord, SandwichUpdate,
};
pub use psb_types::NonEmptyText;
pub use repositories::{ingredients::IngredientService, sandwiches::SandwichService};
pub use store::{connector_from_config, MemoryStore, StoreConnector};
