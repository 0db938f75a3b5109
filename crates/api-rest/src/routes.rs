//! HTTP routes.
//!
//! Handlers only shape requests and responses; every data operation goes through the
//! `psb-core` services, which open and close their own store connection per call.

use crate::error::ApiError;
use api_shared::{
    AddIngredientReq, AddIngredientRes, AddSandwichReq, AddSandwichRes, ErrorRes, HealthRes,
    HealthService, IngredientRefDto, IngredientView, SandwichView,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use psb_core::{
    IngredientRecord, IngredientRef, IngredientService, NewIngredient, NewSandwich,
    SandwichRecord, SandwichService, StoreConnector,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Prefix of the catalogue endpoints.
pub const API_PREFIX: &str = "/api/v1/pubsub";

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    ingredient_service: IngredientService,
    sandwich_service: SandwichService,
}

impl AppState {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            ingredient_service: IngredientService::new(Arc::clone(&connector)),
            sandwich_service: SandwichService::new(connector),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_subs, add_sub, list_ingredients, add_ingredient),
    components(schemas(
        HealthRes,
        ErrorRes,
        IngredientView,
        SandwichView,
        AddIngredientReq,
        AddIngredientRes,
        AddSandwichReq,
        AddSandwichRes,
    ))
)]
struct ApiDoc;

/// Build the REST router: health, the catalogue endpoints and the Swagger UI.
pub fn router(state: AppState) -> Router {
    let catalogue = Router::new()
        .route("/subs", get(list_subs))
        .route("/addsub", post(add_sub))
        .route("/ingredients", get(list_ingredients))
        .route("/addingredient", post(add_ingredient));

    Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, catalogue)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/v1/pubsub/subs",
    responses(
        (status = 200, description = "Every premade sandwich", body = [SandwichView]),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// List every premade sandwich.
///
/// `id` in each element is its zero-based position in this response.
#[axum::debug_handler]
async fn list_subs(State(state): State<AppState>) -> Result<Json<Vec<SandwichView>>, ApiError> {
    let sandwiches = state
        .sandwich_service
        .list_all()
        .await
        .map_err(|e| ApiError::internal("retrieve sandwiches", e))?;

    Ok(Json(
        sandwiches
            .into_iter()
            .enumerate()
            .map(|(position, record)| sandwich_view(position, record))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/pubsub/addsub",
    request_body = AddSandwichReq,
    responses(
        (status = 200, description = "Sandwich added", body = AddSandwichRes),
        (status = 400, description = "Malformed body", body = ErrorRes),
        (status = 422, description = "Body does not describe a sandwich", body = ErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// Add a premade sandwich.
///
/// Ingredient entries are stored as given, apart from identifier coercion. References are not
/// checked against the ingredient collection.
#[axum::debug_handler]
async fn add_sub(
    State(state): State<AppState>,
    payload: Result<Json<AddSandwichReq>, JsonRejection>,
) -> Result<Json<AddSandwichRes>, ApiError> {
    let Json(req) = payload?;

    let sandwich = NewSandwich {
        name: req.name,
        description: req.description,
        ingredients: req
            .ingredients
            .into_iter()
            .map(|r| IngredientRef {
                ingredient_id: r.ingredient_id,
                extra: r.extra,
            })
            .collect(),
        tags: req.tags,
        is_available: req.is_available,
    };

    let sandwich_id = state
        .sandwich_service
        .add(sandwich)
        .await
        .map_err(|e| ApiError::internal("add sandwich", e))?;

    Ok(Json(AddSandwichRes {
        message: "Sandwich added successfully".into(),
        sandwich_id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/pubsub/ingredients",
    responses(
        (status = 200, description = "Every ingredient", body = [IngredientView]),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<IngredientView>>, ApiError> {
    let ingredients = state
        .ingredient_service
        .list_all()
        .await
        .map_err(|e| ApiError::internal("retrieve ingredients", e))?;

    Ok(Json(
        ingredients
            .into_iter()
            .enumerate()
            .map(|(position, record)| ingredient_view(position, record))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/pubsub/addingredient",
    request_body = AddIngredientReq,
    responses(
        (status = 200, description = "Ingredient added", body = AddIngredientRes),
        (status = 400, description = "Malformed body", body = ErrorRes),
        (status = 422, description = "Body does not describe an ingredient", body = ErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn add_ingredient(
    State(state): State<AppState>,
    payload: Result<Json<AddIngredientReq>, JsonRejection>,
) -> Result<Json<AddIngredientRes>, ApiError> {
    let Json(req) = payload?;

    let ingredient = NewIngredient {
        name: req.name,
        kind: req.kind,
        description: req.description,
        tags: req.tags,
        is_available: req.is_available,
    };

    let ingredient_id = state
        .ingredient_service
        .add(ingredient)
        .await
        .map_err(|e| ApiError::internal("add ingredient", e))?;

    Ok(Json(AddIngredientRes {
        message: "Ingredient added successfully".into(),
        ingredient_id,
    }))
}

fn sandwich_view(position: usize, record: SandwichRecord) -> SandwichView {
    SandwichView {
        id: position.to_string(),
        name: record.name,
        description: record.description,
        ingredients: record
            .ingredients
            .into_iter()
            .map(|r| IngredientRefDto {
                ingredient_id: r.ingredient_id,
                extra: r.extra,
            })
            .collect(),
        tags: record.tags,
    }
}

fn ingredient_view(position: usize, record: IngredientRecord) -> IngredientView {
    IngredientView {
        id: position.to_string(),
        name: record.name,
        kind: record.kind,
        description: record.description,
        tags: record.tags,
    }
}
