mod collector;
mod config;
mod distance;
mod errors;
mod google;
mod identity;
mod payload;
mod places;
mod search;
mod server;
#[cfg(test)]
mod testing;

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use collector::Collector;
pub use config::{
    AppConfig, CollectionPlan, CollectionTrigger, DISTRICT_NAMES, MAX_DISTANCE_BATCH, PLACE_TYPES,
};
pub use distance::DistanceEnricher;
pub use errors::{AppError, AppResult};
pub use google::{HttpMapsClient, MapsProvider};
pub use identity::record_id;
pub use payload::{assemble, assemble_with_state, Envelope, TableSchema};
pub use places::{Coordinates, PlaceQuery, PlaceRecord, RawPlaceResult, SearchPage};
pub use search::{PlaceSearchClient, SearchSettings, Throttle, TokioThrottle};
pub use server::{collect_places, router, AppState};

pub fn init_tracing() {
    static INIT: OnceCell<()> = OnceCell::new();
    let _ = INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,city_explorer=debug"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}
