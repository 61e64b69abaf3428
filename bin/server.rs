// Parking Ledger - Web Server
// REST API with Axum over a single shared ledger

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use parking_ledger::{logging, Config, LedgerError, ParkingLedger, Slot, VehicleClass};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    ledger: Arc<ParkingLedger>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ApiErrorBody>,
}

#[derive(Serialize)]
struct ApiErrorBody {
    kind: &'static str,
    message: String,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

/// Ledger error rendered as an HTTP response
struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LedgerError::NotFound(_) | LedgerError::InvalidSlot { .. } => StatusCode::NOT_FOUND,
            LedgerError::InvalidPayload(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiErrorBody {
                kind: self.0.kind(),
                message: self.0.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

#[derive(Deserialize)]
struct RentRequest {
    block: String,
    position: String,
    vehicle_number: String,
    vehicle_class: String,
}

#[derive(Deserialize)]
struct ExitRequest {
    block: String,
    position: String,
    vehicle_number: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// POST /api/grid - Append the slot grid
async fn initialize_grid(State(state): State<AppState>) -> ApiResult {
    let slots = state.ledger.initialize_grid()?;
    Ok(ApiResponse::ok(slots.len()))
}

/// GET /api/slots - All slots in store order
async fn list_slots(State(state): State<AppState>) -> ApiResult {
    Ok(ApiResponse::ok(state.ledger.list_slots()?))
}

/// POST /api/slots - Store a slot as given
async fn add_slot(State(state): State<AppState>, Json(slot): Json<Slot>) -> ApiResult {
    Ok(ApiResponse::ok(state.ledger.add_slot(slot)?))
}

/// GET /api/rates - Hourly rate per vehicle class
async fn list_rates(State(state): State<AppState>) -> Response {
    ApiResponse::ok(state.ledger.list_vehicle_rates())
}

/// GET /api/vehicles
async fn list_vehicles(State(state): State<AppState>) -> ApiResult {
    Ok(ApiResponse::ok(state.ledger.list_vehicles()?))
}

/// POST /api/rentals - Open a rental
async fn rent(State(state): State<AppState>, Json(req): Json<RentRequest>) -> ApiResult {
    let rental = state.ledger.rent(
        &req.block,
        &req.position,
        &req.vehicle_number,
        VehicleClass::parse(&req.vehicle_class),
    )?;
    Ok(ApiResponse::ok(rental))
}

/// POST /api/exit - Close a rental
async fn exit(State(state): State<AppState>, Json(req): Json<ExitRequest>) -> ApiResult {
    let rental = state
        .ledger
        .exit(&req.block, &req.position, &req.vehicle_number)?;
    Ok(ApiResponse::ok(rental))
}

/// GET /api/rentals
async fn list_rentals(State(state): State<AppState>) -> ApiResult {
    Ok(ApiResponse::ok(state.ledger.list_rentals()?))
}

/// GET /api/rentals/:id
async fn get_rental(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    Ok(ApiResponse::ok(state.ledger.get_rental(&id)?))
}

fn build_router(ledger: Arc<ParkingLedger>) -> Router {
    let state = AppState { ledger };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/grid", post(initialize_grid))
        .route("/slots", get(list_slots).post(add_slot))
        .route("/rates", get(list_rates))
        .route("/vehicles", get(list_vehicles))
        .route("/rentals", get(list_rentals).post(rent))
        .route("/rentals/:id", get(get_rental))
        .route("/exit", post(exit))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    logging::init();

    let config = Config::from_env().context("Failed to read configuration")?;
    let ledger = ParkingLedger::open_sqlite(&config.db_path)
        .with_context(|| format!("Failed to open ledger at {}", config.db_path.display()))?;

    let app = build_router(Arc::new(ledger));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "parking ledger server running");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
