use std::{collections::BTreeMap, sync::Arc};

use futures::future::join_all;

use crate::{
    config::PlannerConfig,
    gateway::{DirectionsProvider, GatewayError},
    metrics,
    models::{
        Coordinate, EnrichedRoute, RawRoute, RouteRequest, RouteSet, TransportProfile,
    },
    proximity::count_near_line,
};

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("start and destination must both be set")]
    MissingEndpoints,
    #[error("routing unavailable: {0}")]
    RoutingUnavailable(#[source] GatewayError),
}

impl PlanError {
    pub fn user_message(&self) -> String {
        match self {
            PlanError::MissingEndpoints => "Please set both start and destination.".into(),
            PlanError::RoutingUnavailable(source) => source.user_message(),
        }
    }
}

/// Requests routes per transport profile and turns them into an annotated,
/// ranked [`RouteSet`].
///
/// Driving is mandatory: it is requested first and its distance decides
/// whether walking is offered at all. The remaining profiles are requested
/// concurrently and joined with "wait for all, keep the successes".
#[derive(Clone)]
pub struct RouteEngine {
    directions: Arc<dyn DirectionsProvider>,
    config: Arc<PlannerConfig>,
}

impl RouteEngine {
    pub fn new(directions: Arc<dyn DirectionsProvider>, config: Arc<PlannerConfig>) -> Self {
        Self { directions, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub async fn plan_routes(
        &self,
        req: &RouteRequest,
        signals: &[Coordinate],
    ) -> Result<RouteSet, PlanError> {
        let driving = self
            .directions
            .get_route(TransportProfile::Driving, req.start, req.end)
            .await
            .map_err(PlanError::RoutingUnavailable)?;

        let optional = optional_profiles(driving.summary.distance_m, &self.config);
        tracing::debug!(
            "driving route is {:.0} m, also requesting {:?}",
            driving.summary.distance_m,
            optional
        );

        let settled = join_all(optional.into_iter().map(|profile| async move {
            let result = self.directions.get_route(profile, req.start, req.end).await;
            (profile, result)
        }))
        .await;

        let mut raw = vec![(TransportProfile::Driving, driving)];
        for (profile, result) in settled {
            match result {
                Ok(route) => raw.push((profile, route)),
                Err(err) => tracing::warn!("omitting {profile} from route set: {err}"),
            }
        }

        let weight_kg = req.weight_or(self.config.health.default_weight_kg);
        Ok(build_route_set(raw, signals, weight_kg, &self.config))
    }

    /// Walking leg from a parking spot to the destination. Never part of a
    /// [`RouteSet`].
    pub async fn last_mile_walk(
        &self,
        from: Coordinate,
        destination: Coordinate,
        weight_kg: f64,
    ) -> Result<EnrichedRoute, GatewayError> {
        let raw = self
            .directions
            .get_route(TransportProfile::LastMileWalk, from, destination)
            .await?;
        Ok(enrich_route(TransportProfile::LastMileWalk, raw, &[], weight_kg, &self.config))
    }
}

/// Profiles requested after driving: cycling always, walking only when the
/// driving distance is strictly below the walking cutoff.
pub fn optional_profiles(driving_distance_m: f64, config: &PlannerConfig) -> Vec<TransportProfile> {
    let mut profiles = vec![TransportProfile::Cycling];
    if driving_distance_m < config.routing.max_walking_distance_m {
        profiles.push(TransportProfile::Walking);
    }
    profiles
}

pub fn enrich_route(
    profile: TransportProfile,
    raw: RawRoute,
    signals: &[Coordinate],
    weight_kg: f64,
    config: &PlannerConfig,
) -> EnrichedRoute {
    let signal_count = count_near_line(signals, &raw.geometry.path, config.proximity.signal_threshold_m);

    EnrichedRoute {
        profile,
        cost: metrics::cost(profile, &raw.summary, &config.pricing),
        calories: metrics::calories(profile, raw.summary.duration_s, weight_kg, &config.health),
        co2_saved_grams: metrics::co2_saved_grams(raw.summary.distance_m, &config.health),
        signal_count: u32::try_from(signal_count).unwrap_or(u32::MAX),
        summary: raw.summary,
        geometry: raw.geometry,
    }
}

pub fn recommended_profile<V>(routes: &BTreeMap<TransportProfile, V>) -> TransportProfile {
    if routes.contains_key(&TransportProfile::Cycling) {
        TransportProfile::Cycling
    } else {
        TransportProfile::Driving
    }
}

/// Pure enrichment step of planning: annotate each fetched route and pick
/// the recommended profile.
pub fn build_route_set(
    raw: Vec<(TransportProfile, RawRoute)>,
    signals: &[Coordinate],
    weight_kg: f64,
    config: &PlannerConfig,
) -> RouteSet {
    let routes: BTreeMap<_, _> = raw
        .into_iter()
        .map(|(profile, route)| (profile, enrich_route(profile, route, signals, weight_kg, config)))
        .collect();
    let recommended = recommended_profile(&routes);
    RouteSet { routes, recommended }
}
