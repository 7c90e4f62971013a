use std::{collections::BTreeSet, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    config::PlannerConfig,
    engine::{PlanError, RouteEngine},
    gateway::{GatewayError, GeocodeResult, Gateways, OsmElement, OsmQuery, QueryArea, TagFilter},
    geometry::bounding_box,
    models::{
        rider_weight_or, Coordinate, EnrichedRoute, ParkingSpot, PoiCategory, PointOfInterest,
        RouteBounds, RouteSet, WeatherReport,
    },
    proximity::filter_near_line,
    session::{Endpoint, Session},
};

#[derive(Debug, thiserror::Error)]
pub enum PoiError {
    #[error("no active route to search along")]
    NoActiveRoute,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl PoiError {
    pub fn user_message(&self) -> String {
        match self {
            PoiError::NoActiveRoute => "Plan a route first.".into(),
            PoiError::Gateway(err) => err.user_message(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParkingError {
    #[error("no destination set")]
    NoDestination,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("last-mile walk unavailable: {0}")]
    WalkUnavailable(#[source] GatewayError),
}

impl ParkingError {
    pub fn user_message(&self) -> String {
        match self {
            ParkingError::NoDestination => "Please set a destination first.".into(),
            ParkingError::Gateway(err) => err.user_message(),
            ParkingError::WalkUnavailable(_) => {
                "Could not calculate walking route from parking.".into()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Committed(Arc<RouteSet>),
    /// A newer plan (or a clear) landed first; this result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherStatus {
    Loaded(WeatherReport),
    Unavailable,
}

/// Turns user intents into gateway calls and session updates.
///
/// The session lock is only taken for short synchronous sections, never
/// across a provider call, so a slow plan cannot block a clear or a second
/// plan.
pub struct App {
    config: Arc<PlannerConfig>,
    engine: RouteEngine,
    gateways: Gateways,
    session: Mutex<Session>,
}

impl App {
    pub fn new(config: PlannerConfig, gateways: Gateways) -> Self {
        let config = Arc::new(config);
        let engine = RouteEngine::new(gateways.directions.clone(), config.clone());
        Self {
            config,
            engine,
            gateways,
            session: Mutex::new(Session::new()),
        }
    }

    /// App backed by the real HTTP providers.
    pub fn from_config(config: PlannerConfig) -> Result<Self, reqwest::Error> {
        let gateways = Gateways::http(&config.services)?;
        Ok(Self::new(config, gateways))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub async fn set_start(&self, coord: Coordinate) {
        self.session.lock().await.set_start(coord);
    }

    pub async fn set_end(&self, coord: Coordinate) {
        self.session.lock().await.set_end(coord);
    }

    pub async fn map_click(&self, coord: Coordinate) -> Endpoint {
        self.session.lock().await.map_click(coord)
    }

    pub async fn clear(&self) {
        self.session.lock().await.clear();
        tracing::debug!("session cleared");
    }

    pub async fn endpoints(&self) -> (Option<Coordinate>, Option<Coordinate>) {
        let session = self.session.lock().await;
        (session.start(), session.end())
    }

    pub async fn route_set(&self) -> Option<Arc<RouteSet>> {
        self.session.lock().await.route_set()
    }

    pub async fn signal_count(&self) -> usize {
        self.session.lock().await.signals().len()
    }

    pub async fn geocode(
        &self,
        endpoint: Endpoint,
        text: &str,
    ) -> Result<GeocodeResult, GatewayError> {
        let found = self.gateways.geocoder.search(text).await?;
        tracing::debug!("{endpoint:?} resolved to {} ({})", found.display_name, found.coord);
        self.session.lock().await.set_endpoint(endpoint, found.coord);
        Ok(found)
    }

    /// Accepts either a `lat,lon` pair or free text to geocode.
    pub async fn locate(
        &self,
        endpoint: Endpoint,
        text: &str,
    ) -> Result<GeocodeResult, GatewayError> {
        match text.parse::<Coordinate>() {
            Ok(coord) => {
                self.session.lock().await.set_endpoint(endpoint, coord);
                Ok(GeocodeResult {
                    coord,
                    display_name: coord.to_string(),
                })
            }
            Err(_) => self.geocode(endpoint, text).await,
        }
    }

    /// Replaces the known traffic signals with those inside `view`. On
    /// failure the previous signals are kept; a result overtaken by a newer
    /// refresh or a clear is dropped.
    pub async fn refresh_signals(&self, view: RouteBounds) -> Result<usize, GatewayError> {
        let refresh = self.session.lock().await.begin_signal_refresh();
        let query = OsmQuery {
            area: QueryArea::Bounds(view),
            filters: vec![TagFilter::equals("highway", "traffic_signals")],
            include_ways: false,
        };
        let elements = match self.gateways.osm.query_nodes(&query).await {
            Ok(elements) => elements,
            Err(err) => {
                tracing::warn!("keeping previous traffic signals: {err}");
                return Err(err);
            }
        };
        let signals: Vec<Coordinate> = elements.into_iter().map(|e| e.coord).collect();
        let count = signals.len();
        if self.session.lock().await.record_signals(refresh, signals) {
            tracing::debug!("{count} traffic signals in view");
        }
        Ok(count)
    }

    pub async fn plan(&self, weight_kg: Option<f64>) -> Result<PlanOutcome, PlanError> {
        let (ticket, signals) = {
            let mut session = self.session.lock().await;
            let ticket = session.begin_plan(weight_kg)?;
            (ticket, session.signals().to_vec())
        };

        let set = Arc::new(self.engine.plan_routes(&ticket.request, &signals).await?);

        let committed = self
            .session
            .lock()
            .await
            .record_route_set(&ticket, set.clone());
        if committed {
            tracing::info!(
                "plan {} committed: {:?}, recommending {}",
                ticket.generation(),
                set.profiles().collect::<Vec<_>>(),
                set.recommended
            );
            Ok(PlanOutcome::Committed(set))
        } else {
            Ok(PlanOutcome::Superseded)
        }
    }

    /// Amenities of the selected categories lying along the active route.
    pub async fn points_of_interest(
        &self,
        categories: &[PoiCategory],
    ) -> Result<Vec<PointOfInterest>, PoiError> {
        let line = {
            let session = self.session.lock().await;
            session
                .active_geometry()
                .map(|geometry| geometry.path.clone())
                .ok_or(PoiError::NoActiveRoute)?
        };

        let amenities: BTreeSet<&str> = categories.iter().map(|c| c.amenity()).collect();
        let Some(bounds) = bounding_box(&line) else {
            return Ok(Vec::new());
        };
        if amenities.is_empty() {
            return Ok(Vec::new());
        }

        let query = OsmQuery {
            area: QueryArea::Bounds(bounds),
            filters: vec![TagFilter::OneOf(
                "amenity".into(),
                amenities.into_iter().map(String::from).collect(),
            )],
            include_ways: false,
        };
        let candidates = self
            .gateways
            .osm
            .query_nodes(&query)
            .await?
            .into_iter()
            .filter_map(point_of_interest);

        let pois = filter_near_line(candidates, &line, self.config.proximity.poi_threshold_m);
        tracing::debug!("{} points of interest along the route", pois.len());
        Ok(pois)
    }

    /// Paid parking (nodes and areas) around the destination.
    pub async fn parking(&self) -> Result<Vec<ParkingSpot>, ParkingError> {
        let destination = self.destination().await?;
        let query = OsmQuery {
            area: QueryArea::Around {
                center: destination,
                radius_m: self.config.proximity.parking_radius_m,
            },
            filters: vec![
                TagFilter::equals("amenity", "parking"),
                TagFilter::equals("fee", "yes"),
            ],
            include_ways: true,
        };
        let spots: Vec<ParkingSpot> = self
            .gateways
            .osm
            .query_nodes(&query)
            .await?
            .into_iter()
            .map(|element| ParkingSpot {
                coord: element.coord,
                name: element.tag("name").map(String::from),
            })
            .collect();
        tracing::debug!("{} paid parking spots near destination", spots.len());
        Ok(spots)
    }

    pub async fn last_mile_walk(
        &self,
        spot: &ParkingSpot,
        weight_kg: Option<f64>,
    ) -> Result<EnrichedRoute, ParkingError> {
        let destination = self.destination().await?;
        let weight_kg = rider_weight_or(weight_kg, self.config.health.default_weight_kg);
        self.engine
            .last_mile_walk(spot.coord, destination, weight_kg)
            .await
            .map_err(ParkingError::WalkUnavailable)
    }

    pub async fn weather(&self) -> WeatherStatus {
        let at = self.config.services.weather_location;
        match self.gateways.weather.current_weather(at).await {
            Ok(report) => WeatherStatus::Loaded(report),
            Err(err) => {
                tracing::warn!("{err}");
                WeatherStatus::Unavailable
            }
        }
    }

    async fn destination(&self) -> Result<Coordinate, ParkingError> {
        self.session
            .lock()
            .await
            .end()
            .ok_or(ParkingError::NoDestination)
    }
}

fn point_of_interest(element: OsmElement) -> Option<PointOfInterest> {
    let amenity = element.tag("amenity")?.to_string();
    let name = element.tag("name").map(String::from);
    Some(PointOfInterest {
        coord: element.coord,
        amenity,
        name,
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex as StdMutex};

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::{
        engine::tests::{raw, FixedDirections},
        gateway::{DirectionsProvider, Geocoder, OsmDataProvider, WeatherProvider},
        models::{RawRoute, TransportProfile},
    };

    struct StubGeocoder;

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn search(&self, text: &str) -> Result<GeocodeResult, GatewayError> {
            match text {
                "FC Road" => Ok(GeocodeResult {
                    coord: Coordinate::new(18.5236, 73.8412),
                    display_name: "Fergusson College Road, Pune, MH, India".into(),
                }),
                _ => Err(GatewayError::AddressNotFound(text.into())),
            }
        }
    }

    /// Returns canned elements and remembers every query it was sent.
    #[derive(Default)]
    struct RecordingOsm {
        elements: Vec<OsmElement>,
        fail: bool,
        queries: StdMutex<Vec<OsmQuery>>,
    }

    impl RecordingOsm {
        fn with(elements: Vec<OsmElement>) -> Self {
            Self {
                elements,
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn queries(&self) -> Vec<OsmQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OsmDataProvider for RecordingOsm {
        async fn query_nodes(&self, query: &OsmQuery) -> Result<Vec<OsmElement>, GatewayError> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(GatewayError::DataServiceBusy("overpass returned 504".into()));
            }
            Ok(self.elements.clone())
        }
    }

    struct StubWeather(Option<WeatherReport>);

    #[async_trait]
    impl WeatherProvider for StubWeather {
        async fn current_weather(&self, _at: Coordinate) -> Result<WeatherReport, GatewayError> {
            self.0
                .clone()
                .ok_or_else(|| GatewayError::WeatherUnavailable("401 Unauthorized".into()))
        }
    }

    /// Driving requests block until the test releases them, in call order.
    struct GatedDirections {
        gates: StdMutex<VecDeque<oneshot::Receiver<RawRoute>>>,
    }

    #[async_trait]
    impl DirectionsProvider for GatedDirections {
        async fn get_route(
            &self,
            profile: TransportProfile,
            _start: Coordinate,
            _end: Coordinate,
        ) -> Result<RawRoute, GatewayError> {
            if profile != TransportProfile::Driving {
                return Ok(raw(1_800.0, 540.0));
            }
            let gate = self.gates.lock().unwrap().pop_front();
            match gate {
                Some(gate) => gate.await.map_err(|_| GatewayError::route_failed(profile)),
                None => Err(GatewayError::route_failed(profile)),
            }
        }
    }

    /// Overpass double whose replies are released by the test, in call order.
    struct GatedOsm {
        gates: StdMutex<VecDeque<oneshot::Receiver<Vec<OsmElement>>>>,
    }

    #[async_trait]
    impl OsmDataProvider for GatedOsm {
        async fn query_nodes(&self, _query: &OsmQuery) -> Result<Vec<OsmElement>, GatewayError> {
            let gate = self.gates.lock().unwrap().pop_front();
            match gate {
                Some(gate) => gate
                    .await
                    .map_err(|_| GatewayError::DataServiceBusy("gate dropped".into())),
                None => Err(GatewayError::DataServiceBusy("no reply queued".into())),
            }
        }
    }

    fn gateways(
        directions: Arc<dyn DirectionsProvider>,
        osm: Arc<RecordingOsm>,
    ) -> Gateways {
        Gateways {
            directions,
            geocoder: Arc::new(StubGeocoder),
            osm,
            weather: Arc::new(StubWeather(None)),
        }
    }

    fn app_with(osm: RecordingOsm) -> (App, Arc<RecordingOsm>) {
        let osm = Arc::new(osm);
        let app = App::new(
            PlannerConfig::default(),
            gateways(Arc::new(FixedDirections::new(2_000.0)), osm.clone()),
        );
        (app, osm)
    }

    fn element(coord: Coordinate, tags: &[(&str, &str)]) -> OsmElement {
        OsmElement {
            coord,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn start() -> Coordinate {
        Coordinate::new(18.5204, 73.8567)
    }

    fn end() -> Coordinate {
        Coordinate::new(18.5204, 73.8757)
    }

    /// Metres north of the test route line at `lon`.
    fn north_of_route(meters: f64, lon: f64) -> Coordinate {
        Coordinate::new(18.5204 + meters / 111_195.0, lon)
    }

    #[tokio::test]
    async fn plan_requires_both_endpoints() {
        let (app, _) = app_with(RecordingOsm::default());
        app.set_start(start()).await;
        let err = app.plan(None).await.unwrap_err();
        assert_eq!(err.user_message(), "Please set both start and destination.");
    }

    #[tokio::test]
    async fn plan_commits_and_counts_known_signals() {
        let (app, _) = app_with(RecordingOsm::with(vec![
            element(north_of_route(5.0, 73.86), &[("highway", "traffic_signals")]),
            element(north_of_route(300.0, 73.86), &[("highway", "traffic_signals")]),
        ]));
        app.set_start(start()).await;
        app.set_end(end()).await;
        let view = RouteBounds {
            min_lat: 18.5,
            max_lat: 18.55,
            min_lon: 73.85,
            max_lon: 73.88,
        };
        assert_eq!(app.refresh_signals(view).await.unwrap(), 2);

        let PlanOutcome::Committed(set) = app.plan(Some(70.0)).await.unwrap() else {
            panic!("plan should commit");
        };
        assert_eq!(set.recommended, TransportProfile::Cycling);
        assert_eq!(set.driving().unwrap().signal_count, 1);
        assert_eq!(app.route_set().await, Some(set));
    }

    #[tokio::test]
    async fn failed_signal_refresh_keeps_previous_signals() {
        let (app, _) = app_with(RecordingOsm::with(vec![element(start(), &[])]));
        let view = RouteBounds {
            min_lat: 18.5,
            max_lat: 18.55,
            min_lon: 73.85,
            max_lon: 73.88,
        };
        app.refresh_signals(view).await.unwrap();

        let failing = App {
            gateways: gateways(Arc::new(FixedDirections::new(2_000.0)), Arc::new(RecordingOsm::failing())),
            ..app
        };
        assert!(failing.refresh_signals(view).await.is_err());
        assert_eq!(failing.signal_count().await, 1);
    }

    #[tokio::test]
    async fn late_signal_refresh_is_discarded() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let osm = GatedOsm {
            gates: StdMutex::new(VecDeque::from([first_rx, second_rx])),
        };
        let app = App::new(
            PlannerConfig::default(),
            Gateways {
                directions: Arc::new(FixedDirections::new(2_000.0)),
                geocoder: Arc::new(StubGeocoder),
                osm: Arc::new(osm),
                weather: Arc::new(StubWeather(None)),
            },
        );
        let view = RouteBounds {
            min_lat: 18.5,
            max_lat: 18.55,
            min_lon: 73.85,
            max_lon: 73.88,
        };

        let release = async {
            second_tx
                .send(vec![element(start(), &[]), element(end(), &[])])
                .unwrap();
            while app.signal_count().await == 0 {
                tokio::task::yield_now().await;
            }
            first_tx.send(vec![element(start(), &[])]).unwrap();
        };
        let (first, second, ()) =
            futures::join!(app.refresh_signals(view), app.refresh_signals(view), release);

        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 2);
        assert_eq!(app.signal_count().await, 2);
    }

    #[tokio::test]
    async fn geocoding_sets_the_requested_endpoint() {
        let (app, _) = app_with(RecordingOsm::default());
        let found = app.geocode(Endpoint::End, "FC Road").await.unwrap();
        assert_eq!(found.display_name, "Fergusson College Road, Pune, MH, India");
        assert_eq!(app.endpoints().await, (None, Some(found.coord)));

        let err = app.geocode(Endpoint::Start, "Atlantis").await.unwrap_err();
        assert_eq!(err.user_message(), "Address not found.");
        assert_eq!(app.endpoints().await.0, None);
    }

    #[tokio::test]
    async fn locate_skips_geocoding_for_coordinates() {
        let (app, _) = app_with(RecordingOsm::default());
        let found = app.locate(Endpoint::Start, "18.5, 73.8").await.unwrap();
        assert_eq!(found.coord, Coordinate::new(18.5, 73.8));
        assert_eq!(app.endpoints().await.0, Some(Coordinate::new(18.5, 73.8)));
    }

    #[tokio::test]
    async fn pois_need_an_active_route() {
        let (app, osm) = app_with(RecordingOsm::default());
        let err = app.points_of_interest(&[PoiCategory::Cafe]).await.unwrap_err();
        assert!(matches!(err, PoiError::NoActiveRoute));
        assert!(osm.queries().is_empty());
    }

    #[tokio::test]
    async fn pois_are_filtered_to_the_route() {
        let (app, osm) = app_with(RecordingOsm::with(vec![
            element(north_of_route(10.0, 73.86), &[("amenity", "cafe"), ("name", "Vaishali")]),
            element(north_of_route(24.0, 73.865), &[("amenity", "fuel")]),
            element(north_of_route(60.0, 73.86), &[("amenity", "restaurant")]),
            element(north_of_route(3.0, 73.862), &[("shop", "bakery")]),
        ]));
        app.set_start(start()).await;
        app.set_end(end()).await;
        app.plan(None).await.unwrap();

        assert!(app.points_of_interest(&[]).await.unwrap().is_empty());
        assert!(osm.queries().is_empty());

        let pois = app
            .points_of_interest(&[PoiCategory::Fuel, PoiCategory::Cafe, PoiCategory::Restaurant])
            .await
            .unwrap();
        let names: Vec<String> = pois.iter().map(PointOfInterest::display_name).collect();
        assert_eq!(names, vec!["Vaishali", "fuel"]);

        let queries = osm.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0].filters,
            vec![TagFilter::OneOf(
                "amenity".into(),
                vec!["cafe".into(), "fuel".into(), "restaurant".into()]
            )]
        );
    }

    #[tokio::test]
    async fn busy_map_server_surfaces_for_pois() {
        let (app, osm) = app_with(RecordingOsm::failing());
        app.set_start(start()).await;
        app.set_end(end()).await;
        app.plan(None).await.unwrap();

        let err = app.points_of_interest(&[PoiCategory::Cafe]).await.unwrap_err();
        assert!(matches!(err, PoiError::Gateway(GatewayError::DataServiceBusy(_))));
        assert_eq!(err.user_message(), "Map data server is busy. Please try again.");
        assert_eq!(osm.queries().len(), 1);
    }

    #[tokio::test]
    async fn busy_map_server_surfaces_for_parking() {
        let (app, _) = app_with(RecordingOsm::failing());
        app.set_end(end()).await;

        let err = app.parking().await.unwrap_err();
        assert!(matches!(err, ParkingError::Gateway(GatewayError::DataServiceBusy(_))));
        assert_eq!(err.user_message(), "Map data server is busy. Please try again.");
    }

    #[tokio::test]
    async fn parking_searches_around_destination() {
        let (app, osm) = app_with(RecordingOsm::with(vec![
            element(Coordinate::new(18.521, 73.875), &[("amenity", "parking"), ("fee", "yes")]),
            element(
                Coordinate::new(18.519, 73.876),
                &[("amenity", "parking"), ("fee", "yes"), ("name", "Deccan Multi-level")],
            ),
        ]));
        let err = app.parking().await.unwrap_err();
        assert_eq!(err.user_message(), "Please set a destination first.");

        app.set_end(end()).await;
        let spots = app.parking().await.unwrap();
        let names: Vec<&str> = spots.iter().map(ParkingSpot::display_name).collect();
        assert_eq!(names, vec!["Paid Parking", "Deccan Multi-level"]);

        let query = &osm.queries()[0];
        assert!(query.include_ways);
        assert_eq!(
            query.area,
            QueryArea::Around {
                center: end(),
                radius_m: 800.0
            }
        );
    }

    #[tokio::test]
    async fn last_mile_walk_goes_to_destination() {
        let (app, _) = app_with(RecordingOsm::default());
        app.set_end(end()).await;
        let spot = ParkingSpot {
            coord: Coordinate::new(18.521, 73.875),
            name: None,
        };
        let walk = app.last_mile_walk(&spot, None).await.unwrap();
        assert_eq!(walk.profile, TransportProfile::LastMileWalk);
        assert_eq!(walk.signal_count, 0);

        let nonsense = app.last_mile_walk(&spot, Some(-5.0)).await.unwrap();
        assert_eq!(nonsense.calories, walk.calories);
        let heavier = app.last_mile_walk(&spot, Some(130.0)).await.unwrap();
        assert!(heavier.calories > walk.calories);
    }

    #[tokio::test]
    async fn weather_failure_degrades() {
        let (app, _) = app_with(RecordingOsm::default());
        assert_eq!(app.weather().await, WeatherStatus::Unavailable);

        let report = WeatherReport {
            icon_code: "01d".into(),
            temp_c: 31,
            description: "clear sky".into(),
            feels_like_c: 33,
        };
        let sunny = App {
            gateways: Gateways {
                weather: Arc::new(StubWeather(Some(report.clone()))),
                ..app.gateways.clone()
            },
            ..app
        };
        assert_eq!(sunny.weather().await, WeatherStatus::Loaded(report));
    }

    fn gated_app() -> (App, oneshot::Sender<RawRoute>, oneshot::Sender<RawRoute>) {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let directions = GatedDirections {
            gates: StdMutex::new(VecDeque::from([first_rx, second_rx])),
        };
        let app = App::new(
            PlannerConfig::default(),
            gateways(Arc::new(directions), Arc::new(RecordingOsm::default())),
        );
        (app, first_tx, second_tx)
    }

    #[tokio::test]
    async fn late_result_of_older_plan_is_discarded() {
        let (app, first_tx, second_tx) = gated_app();
        app.set_start(start()).await;
        app.set_end(end()).await;

        let release = async {
            second_tx.send(raw(3_000.0, 420.0)).unwrap();
            while app.route_set().await.is_none() {
                tokio::task::yield_now().await;
            }
            first_tx.send(raw(2_000.0, 300.0)).unwrap();
        };
        let (first, second, ()) = futures::join!(app.plan(None), app.plan(None), release);

        assert!(matches!(first.unwrap(), PlanOutcome::Superseded));
        assert!(matches!(second.unwrap(), PlanOutcome::Committed(_)));
        let set = app.route_set().await.unwrap();
        assert_eq!(set.driving().unwrap().summary.distance_m, 3_000.0);
    }

    #[tokio::test]
    async fn clear_discards_plan_in_flight() {
        let (app, first_tx, _second_tx) = gated_app();
        app.set_start(start()).await;
        app.set_end(end()).await;

        let clear_then_release = async {
            app.clear().await;
            first_tx.send(raw(2_000.0, 300.0)).unwrap();
        };
        let (outcome, ()) = futures::join!(app.plan(None), clear_then_release);

        assert!(matches!(outcome.unwrap(), PlanOutcome::Superseded));
        assert!(app.route_set().await.is_none());
    }
}
