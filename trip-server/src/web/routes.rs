//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::domain::{InvalidId, Location, LocationId, Trip, TripId};
use crate::geocode::{GeocodeError, Geocoder};
use crate::planner::{PlanError, ProgressSnapshot, RoutePlanner, TripProgressor};
use crate::rides::RideProvider;
use crate::store::StoreError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<R, G>(state: AppState<R, G>) -> Router
where
    R: RideProvider + 'static,
    G: Geocoder + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/locations", post(create_location::<R, G>))
        .route(
            "/locations/:id",
            get(get_location::<R, G>)
                .put(update_location::<R, G>)
                .delete(delete_location::<R, G>),
        )
        .route("/trips", post(plan_trip::<R, G>))
        .route("/trips/:id", get(get_trip::<R, G>))
        .route("/trips/:id/request", get(request_leg::<R, G>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body, logging it on failure.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(body), "rejected request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

/// Geocode the address and store a new location.
async fn create_location<R, G>(
    State(state): State<AppState<R, G>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError>
where
    R: RideProvider,
    G: Geocoder,
{
    let req: CreateLocationRequest = parse_body(&body)?;
    let (name, address) = req.into_parts();

    if name.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "name must not be empty".to_string(),
        });
    }

    let coordinate = state
        .config
        .upstream
        .call("geocode", || state.geocoder.geocode(&address))
        .await?;

    let location = state.locations.create(name, address, coordinate).await?;
    info!(
        location_id = %location.id,
        lat = coordinate.lat,
        lng = coordinate.lng,
        "created location"
    );

    Ok((StatusCode::CREATED, Json(location)))
}

async fn get_location<R, G>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<Json<Location>, AppError> {
    let id = LocationId::parse(&id)?;
    Ok(Json(state.locations.get(id).await?))
}

/// Replace a location's address. Coordinates are not re-geocoded.
async fn update_location<R, G>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Location>, AppError> {
    let id = LocationId::parse(&id)?;
    let req: UpdateLocationRequest = parse_body(&body)?;

    let location = state.locations.update_address(id, req.into()).await?;
    info!(location_id = %id, "updated location address");

    Ok(Json(location))
}

async fn delete_location<R, G>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = LocationId::parse(&id)?;
    state.locations.delete(id).await?;
    info!(location_id = %id, "deleted location");

    Ok(StatusCode::NO_CONTENT)
}

/// Plan a trip over the requested destinations.
async fn plan_trip<R, G>(
    State(state): State<AppState<R, G>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError>
where
    R: RideProvider,
{
    let req: PlanTripRequest = parse_body(&body)?;

    let planner = RoutePlanner::new(
        state.rides.as_ref(),
        &state.locations,
        &state.trips,
        state.policy.as_ref(),
        &state.config,
    );
    let trip = planner
        .plan(req.starting_from_location_id, &req.location_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(trip)))
}

async fn get_trip<R, G>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    let id = TripId::parse(&id)?;
    Ok(Json(state.trips.get(id).await?))
}

/// Request a ride for the trip's next leg.
async fn request_leg<R, G>(
    State(state): State<AppState<R, G>>,
    Path(id): Path<String>,
) -> Result<Json<ProgressSnapshot>, AppError>
where
    R: RideProvider,
{
    let id = TripId::parse(&id)?;

    let progressor = TripProgressor::new(
        state.rides.as_ref(),
        &state.locations,
        &state.trips,
        state.policy.as_ref(),
        &state.config,
        &state.progress_ids,
    );

    Ok(Json(progressor.advance(id).await?))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        match e {
            PlanError::InvalidArgument(_) => AppError::BadRequest { message },
            PlanError::NotFound { .. } | PlanError::OutOfRange { .. } => {
                AppError::NotFound { message }
            }
            PlanError::Conflict(_) => AppError::Conflict { message },
            PlanError::Upstream(_) => AppError::BadGateway { message },
            PlanError::Storage(_) => AppError::Internal { message },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        PlanError::from(e).into()
    }
}

impl From<GeocodeError> for AppError {
    fn from(e: GeocodeError) -> Self {
        PlanError::from(e).into()
    }
}

impl From<InvalidId> for AppError {
    fn from(e: InvalidId) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), %message, "request failed");
        } else {
            warn!(status = status.as_u16(), %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}


/// End-to-end tests: the router served on an ephemeral port, driven over
/// HTTP with the mock providers behind it.
#[cfg(test)]
mod http_tests {
    use std::sync::Arc;

    use reqwest::StatusCode as HttpStatus;
    use serde_json::{Value, json};

    use super::*;
    use crate::cache::{CacheConfig, CachedGeocoder};
    use crate::domain::{Address, Coordinate};
    use crate::geocode::StaticGeocoder;
    use crate::planner::{FirstAvailable, PlannerConfig};
    use crate::rides::MockRideProvider;
    use crate::store::{LocationStore, TripStore};

    struct TestServer {
        base: String,
        client: reqwest::Client,
        rides: MockRideProvider,
        geocoder: StaticGeocoder,
    }

    impl TestServer {
        async fn start() -> Self {
            let rides = MockRideProvider::new();
            let geocoder = StaticGeocoder::new();
            let state = AppState::new(
                LocationStore::in_memory(),
                TripStore::in_memory(),
                rides.clone(),
                CachedGeocoder::new(geocoder.clone(), &CacheConfig::default()),
                Arc::new(FirstAvailable),
                PlannerConfig::default(),
            );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, create_router(state)).await.unwrap();
            });

            Self {
                base: format!("http://{addr}"),
                client: reqwest::Client::new(),
                rides,
                geocoder,
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }

        /// Register a street with the geocoder at `coordinate`, reported as
        /// `miles` away by the ride provider.
        fn street(&self, street: &str, coordinate: Coordinate, miles: f64) {
            let address = Address {
                address: street.to_string(),
                city: "Austin".to_string(),
                state: "TX".to_string(),
                zip: String::new(),
            };
            self.geocoder.insert(&address, coordinate);
            self.rides.set_distance(coordinate, miles);
        }

        async fn create_location(&self, name: &str, street: &str) -> u64 {
            let resp = self
                .client
                .post(self.url("/locations"))
                .json(&json!({
                    "name": name,
                    "address": street,
                    "city": "Austin",
                    "state": "TX",
                }))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), HttpStatus::CREATED);
            let body: Value = resp.json().await.unwrap();
            body["id"].as_u64().unwrap()
        }

        async fn get(&self, path: &str) -> (HttpStatus, Value) {
            let resp = self.client.get(self.url(path)).send().await.unwrap();
            let status = resp.status();
            (status, resp.json().await.unwrap_or(Value::Null))
        }
    }

    #[tokio::test]
    async fn health_check() {
        let server = TestServer::start().await;
        let resp = server.client.get(server.url("/health")).send().await.unwrap();
        assert_eq!(resp.status(), HttpStatus::OK);
        assert_eq!(resp.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn location_lifecycle() {
        let server = TestServer::start().await;
        server.street("1 Main St", Coordinate::new(30.27, -97.74), 1.0);

        let resp = server
            .client
            .post(server.url("/locations"))
            .json(&json!({
                "Name": "Office",
                "Address": "1 Main St",
                "City": "Austin",
                "State": "TX",
                "Zip": "78701",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::CREATED);
        let created: Value = resp.json().await.unwrap();
        assert_eq!(created["name"], "Office");
        assert_eq!(created["zip"], "78701");
        assert_eq!(created["lat"], 30.27);
        let id = created["id"].as_u64().unwrap();

        let (status, fetched) = server.get(&format!("/locations/{id}")).await;
        assert_eq!(status, HttpStatus::OK);
        assert_eq!(fetched, created);

        let resp = server
            .client
            .put(server.url(&format!("/locations/{id}")))
            .json(&json!({"address": "9 Elm St", "city": "Dallas", "state": "TX", "zip": "75201"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::OK);
        let updated: Value = resp.json().await.unwrap();
        assert_eq!(updated["address"], "9 Elm St");
        assert_eq!(updated["city"], "Dallas");
        assert_eq!(updated["lat"], 30.27);

        let resp = server
            .client
            .delete(server.url(&format!("/locations/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::NO_CONTENT);

        let (status, body) = server.get(&format!("/locations/{id}")).await;
        assert_eq!(status, HttpStatus::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let resp = server
            .client
            .delete(server.url(&format!("/locations/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_requests_are_bad_requests() {
        let server = TestServer::start().await;

        let resp = server
            .client
            .post(server.url("/locations"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::BAD_REQUEST);

        let resp = server
            .client
            .post(server.url("/locations"))
            .json(&json!({"name": "No address"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::BAD_REQUEST);

        let (status, _) = server.get("/locations/abc").await;
        assert_eq!(status, HttpStatus::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_address_is_bad_gateway() {
        let server = TestServer::start().await;

        let resp = server
            .client
            .post(server.url("/locations"))
            .json(&json!({
                "name": "Nowhere",
                "address": "0 Missing Rd",
                "city": "Austin",
                "state": "TX",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn plan_and_request_every_leg() {
        let server = TestServer::start().await;
        server.street("1 Start St", Coordinate::new(30.0, -97.0), 0.0);
        server.street("2 Far St", Coordinate::new(30.1, -97.0), 5.0);
        server.street("3 Near St", Coordinate::new(30.0, -97.1), 2.0);

        let a = server.create_location("A", "1 Start St").await;
        let b = server.create_location("B", "2 Far St").await;
        let c = server.create_location("C", "3 Near St").await;

        let resp = server
            .client
            .post(server.url("/trips"))
            .json(&json!({
                "starting_from_location_id": a.to_string(),
                "location_ids": [b.to_string(), c.to_string()],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::CREATED);
        let trip: Value = resp.json().await.unwrap();
        assert_eq!(trip["best_route_location_ids"], json!([c, b]));
        assert_eq!(trip["total_distance"], 7.0);
        assert_eq!(trip["status"], "Planning");
        let trip_id = trip["id"].as_u64().unwrap();

        let (status, first) = server.get(&format!("/trips/{trip_id}/request")).await;
        assert_eq!(status, HttpStatus::OK);
        assert_eq!(first["current_location_id"], a);
        assert_eq!(first["next_destination_location_id"], c);
        assert_eq!(first["status"], "requesting");
        assert_eq!(first["uber_wait_time_eta"], 5);

        let (status, second) = server.get(&format!("/trips/{trip_id}/request")).await;
        assert_eq!(status, HttpStatus::OK);
        assert_eq!(second["current_location_id"], c);
        assert_eq!(second["next_destination_location_id"], b);

        let (status, _) = server.get(&format!("/trips/{trip_id}/request")).await;
        assert_eq!(status, HttpStatus::NOT_FOUND);

        let (status, stored) = server.get(&format!("/trips/{trip_id}")).await;
        assert_eq!(status, HttpStatus::OK);
        assert_eq!(stored["status"], "completed");
        assert_eq!(stored["next_leg"], 2);
        assert_eq!(server.rides.issued_rides().len(), 2);
    }

    #[tokio::test]
    async fn planning_errors() {
        let server = TestServer::start().await;
        server.street("1 Start St", Coordinate::new(30.0, -97.0), 0.0);
        let a = server.create_location("A", "1 Start St").await;

        let resp = server
            .client
            .post(server.url("/trips"))
            .json(&json!({"starting_from_location_id": a, "location_ids": []}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::BAD_REQUEST);

        let resp = server
            .client
            .post(server.url("/trips"))
            .json(&json!({"starting_from_location_id": a, "location_ids": [404]}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), HttpStatus::NOT_FOUND);

        let (status, _) = server.get("/trips/99").await;
        assert_eq!(status, HttpStatus::NOT_FOUND);
    }

    #[tokio::test]
    async fn failed_ride_request_is_bad_gateway() {
        let server = TestServer::start().await;
        server.street("1 Start St", Coordinate::new(30.0, -97.0), 0.0);
        server.street("2 Far St", Coordinate::new(30.1, -97.0), 5.0);
        let a = server.create_location("A", "1 Start St").await;
        let b = server.create_location("B", "2 Far St").await;

        let resp = server
            .client
            .post(server.url("/trips"))
            .json(&json!({"starting_from_location_id": a, "location_ids": [b]}))
            .send()
            .await
            .unwrap();
        let trip: Value = resp.json().await.unwrap();
        let trip_id = trip["id"].as_u64().unwrap();

        server.rides.set_fail_requests(true);
        let (status, body) = server.get(&format!("/trips/{trip_id}/request")).await;
        assert_eq!(status, HttpStatus::BAD_GATEWAY);
        assert!(body["error"].as_str().is_some());

        let (_, stored) = server.get(&format!("/trips/{trip_id}")).await;
        assert_eq!(stored["next_leg"], 0);
        assert_eq!(stored["status"], "Planning");
    }
}
