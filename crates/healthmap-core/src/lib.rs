pub mod app_config;
pub mod config;
pub mod geo;
pub mod places;
pub mod routes;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{haversine_km, round_to_tenth, Coordinate, EARTH_RADIUS_KM};
pub use places::{ImageBucket, ImageRef, Place, PlaceId, PlaceKind};
pub use routes::Route;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
