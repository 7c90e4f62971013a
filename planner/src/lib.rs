//! Multimodal route planning for city trips.
//!
//! Routes for driving, cycling and (for short trips) walking are fetched
//! from a directions provider, annotated with fare, calories, CO₂ saved and
//! traffic signals along the way, and ranked so cycling is recommended when
//! it is available. Points of interest along the active route, paid parking
//! near the destination and current weather round out the picture.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod geometry;
pub mod gpx_export;
pub mod metrics;
pub mod models;
pub mod presentation;
pub mod proximity;
pub mod session;

pub use app::{App, ParkingError, PlanOutcome, PoiError, WeatherStatus};
pub use config::PlannerConfig;
pub use engine::{PlanError, RouteEngine};
pub use gateway::{GatewayError, Gateways};
pub use session::Endpoint;
