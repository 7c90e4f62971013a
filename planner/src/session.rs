use std::sync::Arc;

use crate::{
    engine::PlanError,
    models::{Coordinate, RouteGeometry, RouteRequest, RouteSet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// Handed out by [`Session::begin_plan`]; a plan result is only committed if
/// no newer plan has been committed since its ticket was issued.
#[derive(Debug, Clone, Copy)]
pub struct PlanTicket {
    generation: u64,
    pub request: RouteRequest,
}

impl PlanTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-user planning state: chosen endpoints, the last committed route set
/// and the signals fetched for the current view.
#[derive(Debug, Default)]
pub struct Session {
    start: Option<Coordinate>,
    end: Option<Coordinate>,
    route_set: Option<Arc<RouteSet>>,
    signals: Vec<Coordinate>,
    issued: u64,
    committed: u64,
    signal_refreshes: u64,
    signals_committed: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<Coordinate> {
        self.start
    }

    pub fn end(&self) -> Option<Coordinate> {
        self.end
    }

    pub fn set_start(&mut self, coord: Coordinate) {
        self.start = Some(coord);
    }

    pub fn set_end(&mut self, coord: Coordinate) {
        self.end = Some(coord);
    }

    pub fn set_endpoint(&mut self, endpoint: Endpoint, coord: Coordinate) {
        match endpoint {
            Endpoint::Start => self.set_start(coord),
            Endpoint::End => self.set_end(coord),
        }
    }

    /// Places the destination when only a start is set, the start otherwise.
    pub fn map_click(&mut self, coord: Coordinate) -> Endpoint {
        let endpoint = match (self.start, self.end) {
            (Some(_), None) => Endpoint::End,
            _ => Endpoint::Start,
        };
        self.set_endpoint(endpoint, coord);
        endpoint
    }

    /// Drops endpoints, routes and signals. Plans and signal refreshes still
    /// in flight can no longer commit.
    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
        self.route_set = None;
        self.signals.clear();
        self.committed = self.issued;
        self.signals_committed = self.signal_refreshes;
    }

    pub fn signals(&self) -> &[Coordinate] {
        &self.signals
    }

    /// Numbers a traffic-signal refresh for [`Session::record_signals`].
    pub fn begin_signal_refresh(&mut self) -> u64 {
        self.signal_refreshes += 1;
        self.signal_refreshes
    }

    /// Replaces the known signals unless a later refresh already did.
    pub fn record_signals(&mut self, refresh: u64, signals: Vec<Coordinate>) -> bool {
        if refresh <= self.signals_committed {
            tracing::debug!(
                "discarding stale signal refresh {refresh} (committed {})",
                self.signals_committed
            );
            return false;
        }
        self.signals_committed = refresh;
        self.signals = signals;
        true
    }

    pub fn route_set(&self) -> Option<Arc<RouteSet>> {
        self.route_set.clone()
    }

    pub fn active_geometry(&self) -> Option<&RouteGeometry> {
        self.route_set.as_deref().and_then(RouteSet::active_geometry)
    }

    pub fn begin_plan(&mut self, weight_kg: Option<f64>) -> Result<PlanTicket, PlanError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(PlanError::MissingEndpoints);
        };
        self.issued += 1;
        Ok(PlanTicket {
            generation: self.issued,
            request: RouteRequest {
                start,
                end,
                weight_kg,
            },
        })
    }

    /// Stores `set` unless a plan issued later has already been committed.
    /// Returns whether it was stored.
    pub fn record_route_set(&mut self, ticket: &PlanTicket, set: Arc<RouteSet>) -> bool {
        if ticket.generation <= self.committed {
            tracing::debug!(
                "discarding stale plan {} (committed {})",
                ticket.generation,
                self.committed
            );
            return false;
        }
        self.committed = ticket.generation;
        self.route_set = Some(set);
        true
    }
}
