use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trip_server::cache::{CacheConfig, CachedGeocoder};
use trip_server::config::ServerConfig;
use trip_server::domain::Coordinate;
use trip_server::geocode::{Geocoder, GoogleGeocoder, StaticGeocoder};
use trip_server::planner::SelectionPolicy;
use trip_server::rides::{MockRideProvider, RideClient, RideProvider};
use trip_server::store::{LocationStore, SnapshotFile, TripStore};
use trip_server::web::{AppState, create_router};

/// Where offline geocoding places unknown addresses (downtown San Francisco).
const OFFLINE_ORIGIN: Coordinate = Coordinate {
    lat: 37.7749,
    lng: -122.4194,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,trip_server=debug")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let config = ServerConfig::from_env()?;
    let policy = config.policy()?;

    if config.offline {
        info!("offline mode: using mock ride provider and static geocoder");
        let geocoder = StaticGeocoder::new().with_fallback(OFFLINE_ORIGIN);
        serve(&config, MockRideProvider::new(), geocoder, policy).await
    } else {
        let rides = RideClient::new(config.ride_config())?;
        let geocoder = GoogleGeocoder::new(config.geocode_config())?;
        serve(&config, rides, geocoder, policy).await
    }
}

async fn serve<R, G>(
    config: &ServerConfig,
    rides: R,
    geocoder: G,
    policy: Arc<dyn SelectionPolicy>,
) -> Result<(), BoxError>
where
    R: RideProvider + 'static,
    G: Geocoder + 'static,
{
    let (locations, trips) = match &config.data_dir {
        Some(dir) => open_stores(dir)?,
        None => (LocationStore::in_memory(), TripStore::in_memory()),
    };
    info!(
        locations = locations.len().await,
        trips = trips.len().await,
        policy = policy.name(),
        "stores ready"
    );

    let geocoder = CachedGeocoder::new(geocoder, &CacheConfig::default());
    let state = AppState::new(
        locations,
        trips,
        rides,
        geocoder,
        policy,
        config.planner_config(),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "trip planner listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn open_stores(dir: &Path) -> Result<(LocationStore, TripStore), BoxError> {
    info!(dir = %dir.display(), "loading snapshots");
    let locations = LocationStore::open(SnapshotFile::in_dir(dir, "location"))?;
    let trips = TripStore::open(SnapshotFile::in_dir(dir, "trip"))?;
    Ok((locations, trips))
}
