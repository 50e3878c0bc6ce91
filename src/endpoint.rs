/// HTTP endpoint for the climate dataset
///
/// Read-only JSON API over the measurement and station tables, plus an
/// HTML index for people browsing by hand.
///
/// Endpoints:
/// - GET /                          - Route index (HTML)
/// - GET /api/v1.0/precipitation    - Last year of precipitation, keyed by date
/// - GET /api/v1.0/stations         - Station identifiers
/// - GET /api/v1.0/tobs             - Last year of temperatures at the most active station
/// - GET /api/v1.0/{start}          - TMIN/TAVG/TMAX from start onwards
/// - GET /api/v1.0/{start}/{end}    - TMIN/TAVG/TMAX between start and end inclusive
/// - GET /health                    - Service health check

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use threadpool::ThreadPool;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{error, info, warn};

use crate::queries::{self, QueryError};
use crate::store::ClimateStore;

const API_PREFIX: &str = "/api/v1.0/";

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/{start}",
    "/api/v1.0/{start}/{end}",
    "/health",
];

const INDEX_HTML: &str = "<h1>Welcome to the Climate API!</h1><br/>\
<h3>Available Routes:</h3>\
<ul>\
<li><a href='/api/v1.0/precipitation'>/api/v1.0/precipitation</a> - Precipitation data for the past year.</li>\
<li><a href='/api/v1.0/stations'>/api/v1.0/stations</a> - List of weather observation stations.</li>\
<li><a href='/api/v1.0/tobs'>/api/v1.0/tobs</a> - Temperature observations of the most active station for the past year.</li>\
<li><b>/api/v1.0/&lt;start&gt;</b> - Replace <i>&lt;start&gt;</i> with a start date in YYYY-MM-DD format \
to get min, avg, and max temperatures from that date onward.</li>\
<li><b>/api/v1.0/&lt;start&gt;/&lt;end&gt;</b> - Replace <i>&lt;start&gt;</i> and <i>&lt;end&gt;</i> with a date range \
in YYYY-MM-DD format to get min, avg, and max temperatures for that range.</li>\
</ul>";

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Index,
    Health,
    Precipitation,
    Stations,
    Tobs,
    TemperatureFrom { start: String },
    TemperatureRange { start: String, end: String },
    NotFound,
}

/// Matches a request URL to a route.
///
/// The query string is ignored and the path is percent-decoded before
/// matching. The fixed `/api/v1.0/` names take precedence over `{start}`.
pub fn route(url: &str) -> Route {
    let raw_path = url.split('?').next().unwrap_or("");
    let path = match urlencoding::decode(raw_path) {
        Ok(path) => path,
        Err(_) => return Route::NotFound,
    };

    match &*path {
        "/" => return Route::Index,
        "/health" => return Route::Health,
        _ => {}
    }

    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return Route::NotFound;
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Route::NotFound;
    }

    match segments.as_slice() {
        ["precipitation"] => Route::Precipitation,
        ["stations"] => Route::Stations,
        ["tobs"] => Route::Tobs,
        [start] => Route::TemperatureFrom { start: start.to_string() },
        [start, end] => Route::TemperatureRange {
            start: start.to_string(),
            end: end.to_string(),
        },
        _ => Route::NotFound,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// A response ready to be written by the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Set for 405 responses.
    pub allow: Option<&'static str>,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
                allow: None,
            },
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                Self::internal_error()
            }
        }
    }

    fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
            allow: None,
        }
    }

    fn internal_error() -> Self {
        Self {
            status: 500,
            content_type: "application/json",
            body: r#"{"error": "Internal server error"}"#.to_string(),
            allow: None,
        }
    }

    fn not_found() -> Self {
        Self::json(
            404,
            &serde_json::json!({
                "error": "Not found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        )
    }

    fn method_not_allowed() -> Self {
        let mut response = Self::json(405, &serde_json::json!({ "error": "Method not allowed" }));
        response.allow = Some("GET, HEAD");
        response
    }
}

/// Request handlers bound to one climate store.
///
/// Constructed once at startup and shared read-only by every worker.
pub struct ClimateApi {
    store: Arc<dyn ClimateStore>,
}

impl ClimateApi {
    pub fn new(store: Arc<dyn ClimateStore>) -> Self {
        Self { store }
    }

    /// Route and answer a single request.
    pub fn handle(&self, method: &Method, url: &str) -> ApiResponse {
        let route = route(url);
        if route == Route::NotFound {
            return ApiResponse::not_found();
        }
        if !matches!(method, Method::Get | Method::Head) {
            return ApiResponse::method_not_allowed();
        }

        let store = self.store.as_ref();
        match route {
            Route::Index => ApiResponse::html(INDEX_HTML),
            Route::Health => handle_health(),
            Route::Precipitation => respond_with(queries::precipitation_last_year(store)),
            Route::Stations => respond_with(queries::station_list(store)),
            Route::Tobs => respond_with(queries::tobs_last_year(store)),
            Route::TemperatureFrom { start } => {
                respond_with(queries::temperature_stats(store, &start, None))
            }
            Route::TemperatureRange { start, end } => {
                respond_with(queries::temperature_stats(store, &start, Some(end.as_str())))
            }
            Route::NotFound => ApiResponse::not_found(),
        }
    }
}

/// Handle /health endpoint
fn handle_health() -> ApiResponse {
    ApiResponse::json(
        200,
        &serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

fn respond_with<T: Serialize>(result: Result<T, QueryError>) -> ApiResponse {
    match result {
        Ok(value) => ApiResponse::json(200, &value),
        Err(e) => {
            error!("Query failed: {}", e);
            ApiResponse::internal_error()
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Failed to start HTTP server on {addr}: {message}")]
    Bind { addr: String, message: String },
}

/// Listening socket plus the worker pool that answers it.
pub struct EndpointServer {
    server: Server,
    api: Arc<ClimateApi>,
    workers: usize,
}

impl EndpointServer {
    /// Bind to `addr` (`host:port`; port 0 picks a free one).
    pub fn bind(addr: &str, api: ClimateApi, workers: usize) -> Result<Self, EndpointError> {
        let server = Server::http(addr).map_err(|e| EndpointError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            server,
            api: Arc::new(api),
            workers: workers.max(1),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Accept requests until the listener closes, handing each to a worker.
    pub fn serve(self) {
        let pool = ThreadPool::new(self.workers);
        if let Some(addr) = self.local_addr() {
            info!(workers = self.workers, "HTTP endpoint listening on http://{}", addr);
        }

        for request in self.server.incoming_requests() {
            let api = Arc::clone(&self.api);
            pool.execute(move || respond(&api, request));
        }

        pool.join();
    }
}

fn respond(api: &ClimateApi, request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let response = api.handle(&method, &url);
    info!(method = %method, url = %url, status = response.status, "Handled request");

    let mut http = Response::from_data(response.body.into_bytes())
        .with_status_code(StatusCode::from(response.status));
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes()) {
        http = http.with_header(header);
    }
    if let Some(allow) = response.allow {
        if let Ok(header) = Header::from_bytes(&b"Allow"[..], allow.as_bytes()) {
            http = http.with_header(header);
        }
    }

    if let Err(e) = request.respond(http) {
        warn!("Failed to send response: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, m};
    use serde_json::{Value, json};

    fn api_for(db: &fixtures::TestDb) -> ClimateApi {
        ClimateApi::new(Arc::new(db.store()))
    }

    fn get_json(api: &ClimateApi, url: &str) -> (u16, Value) {
        let response = api.handle(&Method::Get, url);
        let body = serde_json::from_str(&response.body).expect("Body should be JSON");
        (response.status, body)
    }

    #[test]
    fn test_route_matching() {
        assert_eq!(route("/"), Route::Index);
        assert_eq!(route("/health"), Route::Health);
        assert_eq!(route("/api/v1.0/precipitation"), Route::Precipitation);
        assert_eq!(route("/api/v1.0/stations"), Route::Stations);
        assert_eq!(route("/api/v1.0/tobs"), Route::Tobs);
        assert_eq!(
            route("/api/v1.0/2017-01-01"),
            Route::TemperatureFrom { start: "2017-01-01".to_string() }
        );
        assert_eq!(
            route("/api/v1.0/2017-01-01/2017-02-01"),
            Route::TemperatureRange {
                start: "2017-01-01".to_string(),
                end: "2017-02-01".to_string(),
            }
        );
    }

    #[test]
    fn test_route_ignores_query_and_decodes_path() {
        assert_eq!(route("/api/v1.0/tobs?station=X"), Route::Tobs);
        assert_eq!(
            route("/api/v1.0/2017%2D01%2D01"),
            Route::TemperatureFrom { start: "2017-01-01".to_string() }
        );
    }

    #[test]
    fn test_route_rejects_unknown_shapes() {
        assert_eq!(route("/api/v1.0"), Route::NotFound);
        assert_eq!(route("/api/v1.0/"), Route::NotFound);
        assert_eq!(route("/api/v1.0/a//b"), Route::NotFound);
        assert_eq!(route("/api/v1.0/2017-01-01/"), Route::NotFound);
        assert_eq!(route("/api/v1.0/a/b/c"), Route::NotFound);
        assert_eq!(route("/api/v2.0/tobs"), Route::NotFound);
        assert_eq!(route("/site/05568500"), Route::NotFound);
    }

    #[test]
    fn test_index_lists_routes() {
        let db = fixtures::seeded_db(&[]);
        let response = api_for(&db).handle(&Method::Get, "/");

        assert_eq!(response.status, 200);
        assert!(response.content_type.starts_with("text/html"));
        for path in ["/api/v1.0/precipitation", "/api/v1.0/stations", "/api/v1.0/tobs"] {
            assert!(response.body.contains(path), "Index should link {}", path);
        }
    }

    #[test]
    fn test_precipitation_last_write_wins() {
        let db = fixtures::seeded_db(&[
            m("A", "2017-08-23", Some(0.5), 80.0),
            m("B", "2017-08-23", None, 79.0),
        ]);

        let (status, body) = get_json(&api_for(&db), "/api/v1.0/precipitation");
        assert_eq!(status, 200);
        assert_eq!(body, json!({"2017-08-23": null}));
    }

    #[test]
    fn test_stations_is_array_of_ids() {
        let db = fixtures::seeded_db(&[]);
        let (status, body) = get_json(&api_for(&db), "/api/v1.0/stations");

        assert_eq!(status, 200);
        assert_eq!(body.as_array().map(Vec::len), Some(fixtures::STATIONS.len()));
        assert!(body.as_array().unwrap().iter().all(Value::is_string));
    }

    #[test]
    fn test_tobs_is_array_of_single_key_objects() {
        let db = fixtures::seeded_db(&fixtures::sample_measurements());
        let (status, body) = get_json(&api_for(&db), "/api/v1.0/tobs");

        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!([
                {"2016-08-23": 77.0},
                {"2017-01-01": 66.0},
                {"2017-08-18": 79.0},
                {"2017-08-23": 76.0},
            ])
        );
    }

    #[test]
    fn test_temperature_routes() {
        let db = fixtures::seeded_db(&[
            m("A", "2017-08-21", None, 70.0),
            m("A", "2017-08-22", None, 80.0),
            m("B", "2017-08-23", None, 90.0),
        ]);
        let api = api_for(&db);

        let (status, body) = get_json(&api, "/api/v1.0/2017-08-22");
        assert_eq!(status, 200);
        assert_eq!(body, json!({"TMIN": 80.0, "TAVG": 85.0, "TMAX": 90.0}));

        let (_, body) = get_json(&api, "/api/v1.0/2017-08-21/2017-08-22");
        assert_eq!(body, json!({"TMIN": 70.0, "TAVG": 75.0, "TMAX": 80.0}));

        let (status, body) = get_json(&api, "/api/v1.0/garbage");
        assert_eq!(status, 200);
        assert_eq!(body, json!({"TMIN": null, "TAVG": null, "TMAX": null}));
    }

    #[test]
    fn test_empty_dataset_is_a_server_error() {
        let db = fixtures::seeded_db(&[]);
        let (status, body) = get_json(&api_for(&db), "/api/v1.0/precipitation");

        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[test]
    fn test_unknown_path_is_404_and_wrong_method_is_405() {
        let db = fixtures::seeded_db(&[]);
        let api = api_for(&db);

        let (status, body) = get_json(&api, "/nope");
        assert_eq!(status, 404);
        assert_eq!(body["error"], "Not found");

        let response = api.handle(&Method::Post, "/api/v1.0/stations");
        assert_eq!(response.status, 405);
        assert_eq!(response.allow, Some("GET, HEAD"));
    }

    #[test]
    fn test_health_does_not_touch_storage() {
        let db = fixtures::TestDb::empty();
        let (status, body) = get_json(&api_for(&db), "/health");

        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "climate_service");
    }
}
