//! View-model helpers: turn route sets and reports into the text and styles
//! a map widget or terminal shows. Nothing here performs I/O.

use serde::Serialize;

use crate::models::{EnrichedRoute, RouteSet, TransportProfile, WeatherAdvice, WeatherReport};

const ROUTE_OPACITY: f64 = 0.85;

pub fn format_meters(m: f64) -> String {
    if m >= 1000.0 {
        format!("{:.1} km", m / 1000.0)
    } else {
        format!("{} m", m.round())
    }
}

pub fn format_seconds(s: f64) -> String {
    let minutes = (s / 60.0).round();
    if minutes < 60.0 {
        format!("{minutes} min")
    } else {
        format!("{:.1} h", minutes / 60.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub profile: TransportProfile,
    pub label: &'static str,
    pub color: &'static str,
}

/// Legend rows for the profiles present in `set`.
pub fn legend(set: &RouteSet) -> Vec<LegendEntry> {
    [
        TransportProfile::Cycling,
        TransportProfile::Driving,
        TransportProfile::Walking,
    ]
    .into_iter()
    .filter(|profile| set.contains(*profile))
    .map(|profile| LegendEntry {
        profile,
        label: profile.label(),
        color: profile.color(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteBlock {
    pub profile: TransportProfile,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_saved: Option<String>,
    pub blocks: Vec<RouteBlock>,
}

impl Summary {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.time_saved.iter().map(String::as_str).chain(
            self.blocks
                .iter()
                .flat_map(|block| std::iter::once(block.headline.as_str()).chain(block.health.as_deref())),
        )
    }
}

pub fn summary(set: &RouteSet) -> Summary {
    let blocks = [
        TransportProfile::Cycling,
        TransportProfile::Walking,
        TransportProfile::Driving,
    ]
    .into_iter()
    .filter_map(|profile| set.get(profile))
    .map(route_block)
    .collect();

    Summary {
        time_saved: time_saved(set),
        blocks,
    }
}

/// Banner comparing driving against cycling, or against walking when there
/// is no cycling route.
fn time_saved(set: &RouteSet) -> Option<String> {
    let driving = set.driving()?;
    let (alternative, verb) = match set.get(TransportProfile::Cycling) {
        Some(cycling) => (cycling, "cycling"),
        None => (set.get(TransportProfile::Walking)?, "walking"),
    };
    let saved = driving.summary.duration_s - alternative.summary.duration_s;
    (saved > 0.0).then(|| format!("⚡ You save ~{} by {verb}!", format_seconds(saved)))
}

pub fn route_block(route: &EnrichedRoute) -> RouteBlock {
    let mut headline = format!(
        "{}: {} • {}",
        route.profile.label(),
        format_meters(route.summary.distance_m),
        format_seconds(route.summary.duration_s)
    );
    if route.cost > 0 {
        headline.push_str(&format!(" • ₹{}", route.cost));
    }
    if route.signal_count > 0 {
        headline.push_str(&format!(" • 🚦x {}", route.signal_count));
    }

    let health = (route.profile != TransportProfile::Driving).then(|| {
        format!(
            "🔥 {} kcal burned • 🌳 {}g CO₂ saved",
            route.calories, route.co2_saved_grams
        )
    });

    RouteBlock {
        profile: route.profile,
        headline,
        health,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerStyle {
    pub color: &'static str,
    pub weight: u8,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<&'static str>,
}

pub fn layer_style(profile: TransportProfile) -> LayerStyle {
    LayerStyle {
        color: profile.color(),
        weight: profile.line_weight(),
        opacity: ROUTE_OPACITY,
        dash_array: profile.dash_array(),
    }
}

pub fn advice_text(advice: WeatherAdvice) -> &'static str {
    match advice {
        WeatherAdvice::RainLikely => "🌧️ Rain likely, be prepared.",
        WeatherAdvice::ExtremeHeat => "☀️ Extreme heat, stay hydrated!",
        WeatherAdvice::GreatForRide => "👍 Great weather for a ride!",
    }
}

pub fn weather_line(report: &WeatherReport, city: &str) -> String {
    format!(
        "{}°C in {city}. {}",
        report.temp_c,
        advice_text(report.advice())
    )
}

pub const WEATHER_UNAVAILABLE: &str = "Could not load weather data.";

pub fn location_found(display_name: &str) -> String {
    format!("Location found: {display_name}")
}

pub fn pois_found(count: usize) -> String {
    format!("Found {count} relevant points of interest.")
}

pub fn parking_found(count: usize, radius_m: f64) -> String {
    if count == 0 {
        format!("No paid parking found within {}m of destination.", radius_m.round())
    } else {
        format!("Found {count} paid parking locations.")
    }
}

pub fn last_mile_walk_status(walk: &EnrichedRoute) -> String {
    format!(
        "Walk from parking: {} • {}",
        format_meters(walk.summary.distance_m),
        format_seconds(walk.summary.duration_s)
    )
}
