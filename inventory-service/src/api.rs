use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use shared::*;
use std::sync::Arc;
use crate::error::ServiceError;
use crate::inventory::InventoryQueryService;
use crate::purchase::PurchaseCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub purchases: Arc<PurchaseCoordinator>,
    pub inventory: Arc<InventoryQueryService>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/inventory/:product_id", get(get_inventory).put(update_quantity))
        .route("/api/purchase", post(purchase))
        .route("/api/purchase/history/:product_id", get(purchase_history))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

fn error_response(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InsufficientStock(_) | ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Unexpected(e) => {
            tracing::error!("Unexpected error: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(err.to_string())))
}

// axum's own rejections are plain text; keep the `{"error": ...}` shape.
fn parse_product_id(path: Result<Path<ProductId>, PathRejection>) -> Result<ProductId, ApiError> {
    path.map(|Path(product_id)| product_id)
        .map_err(|rejection| (rejection.status(), Json(ErrorResponse::new(rejection.body_text()))))
}

fn parse_body<T>(json: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    json.map(|Json(body)| body)
        .map_err(|rejection| (rejection.status(), Json(ErrorResponse::new(rejection.body_text()))))
}

pub async fn get_inventory(
    State(state): State<AppState>,
    path: Result<Path<ProductId>, PathRejection>,
) -> ApiResult<InventoryRecord> {
    let product_id = parse_product_id(path)?;
    state
        .inventory
        .get_inventory(product_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_quantity(
    State(state): State<AppState>,
    path: Result<Path<ProductId>, PathRejection>,
    json: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> ApiResult<InventoryRecord> {
    let product_id = parse_product_id(path)?;
    let request = parse_body(json)?;
    state
        .inventory
        .update_quantity(product_id, request.quantity)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn purchase(
    State(state): State<AppState>,
    json: Result<Json<PurchaseRequest>, JsonRejection>,
) -> ApiResult<InventoryRecord> {
    let request = parse_body(json)?;
    state
        .purchases
        .purchase(request)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn purchase_history(
    State(state): State<AppState>,
    path: Result<Path<ProductId>, PathRejection>,
) -> ApiResult<Vec<PurchaseHistoryEntry>> {
    let product_id = parse_product_id(path)?;
    state
        .inventory
        .purchase_history(product_id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn health_check() -> &'static str {
    "OK"
}
