//! Pricing and health figures derived from a route summary.
//!
//! Every function here is deterministic in its inputs; rounding follows
//! "half away from zero", which for the non-negative amounts involved is the
//! same as rounding half up.

use crate::config::{HealthConfig, PricingConfig};
use crate::models::{RouteSummary, TransportProfile};

/// Oxygen uptake of one MET, in ml/kg/min.
const MET_OXYGEN_ML: f64 = 3.5;

/// Fare in whole rupees. Driving is billed as an auto-rickshaw ride,
/// cycling as a bike-share rental, walking is free.
pub fn cost(profile: TransportProfile, summary: &RouteSummary, pricing: &PricingConfig) -> u32 {
    let amount = match profile.metric_profile() {
        TransportProfile::Driving => {
            let fare = &pricing.auto_rickshaw;
            let distance_km = summary.distance_m / 1000.0;
            fare.base_fare + (distance_km - fare.min_km).max(0.0) * fare.per_km
        }
        TransportProfile::Cycling => {
            let fare = &pricing.bike_share;
            fare.unlock_fee + summary.duration_s / 60.0 * fare.per_minute
        }
        TransportProfile::Walking | TransportProfile::LastMileWalk => 0.0,
    };
    to_whole(amount)
}

pub fn met_value(profile: TransportProfile, health: &HealthConfig) -> Option<f64> {
    match profile.metric_profile() {
        TransportProfile::Cycling => Some(health.met_cycling),
        TransportProfile::Walking | TransportProfile::LastMileWalk => Some(health.met_walking),
        TransportProfile::Driving => None,
    }
}

/// `MET * 3.5 * kg / 200` kcal per minute; zero for profiles without a MET value.
pub fn calories(
    profile: TransportProfile,
    duration_s: f64,
    weight_kg: f64,
    health: &HealthConfig,
) -> u32 {
    match met_value(profile, health) {
        Some(met) => to_whole(met * MET_OXYGEN_ML * weight_kg / 200.0 * (duration_s / 60.0)),
        None => 0,
    }
}

/// Grams of CO₂ a car would emit over `distance_m`.
pub fn co2_saved_grams(distance_m: f64, health: &HealthConfig) -> u32 {
    to_whole(distance_m / 1000.0 * health.car_emissions_g_per_km)
}

fn to_whole(amount: f64) -> u32 {
    if amount.is_finite() && amount > 0.0 {
        amount.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}
