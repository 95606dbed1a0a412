use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::Path,
    http::{header, Response, StatusCode},
    routing::get,
    Router,
};
use futures_util::stream;
use std::{
    io,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use studio_gateway::{
    build_router, serve,
    telemetry::{metrics::ExportError, MetricsExporter, MetricsRegistry, RequestMetrics},
    AppConfig, AppState,
};
use tokio::net::TcpListener;

/// A running gateway plus the metrics it has recorded so far.
pub struct TestGateway {
    pub base_url: String,
    pub recorded: Arc<Mutex<Vec<RequestMetrics>>>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Waits for the metrics middleware to record a request to `path`.
    pub async fn wait_for_metrics(&self, path: &str) -> RequestMetrics {
        for _ in 0..100 {
            if let Some(found) = self
                .recorded
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.path == path)
                .cloned()
            {
                return found;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("no metrics recorded for {}", path);
    }
}

struct CaptureExporter(Arc<Mutex<Vec<RequestMetrics>>>);

#[async_trait]
impl MetricsExporter for CaptureExporter {
    async fn export_metrics(&self, metrics: RequestMetrics) -> Result<(), ExportError> {
        self.0.lock().unwrap().push(metrics);
        Ok(())
    }

    fn name(&self) -> &str {
        "capture"
    }
}

pub async fn spawn_gateway() -> TestGateway {
    let config = AppConfig {
        upstream_connect_timeout: Duration::from_secs(2),
        upstream_timeout: Some(Duration::from_secs(10)),
        use_system_proxy: false,
        ..AppConfig::default()
    };
    let state = AppState::from_config(&config).expect("default config is valid");

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let registry = Arc::new(MetricsRegistry::new(false));
    registry
        .register_exporter(Box::new(CaptureExporter(recorded.clone())))
        .await;

    let addr = spawn(build_router(state, registry)).await;
    TestGateway {
        base_url: format!("http://{}", addr),
        recorded,
    }
}

/// Deterministic image bytes so relayed bodies can be compared exactly.
pub fn image_bytes(kind: &str, len: usize) -> Vec<u8> {
    let seed = kind.bytes().fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    (0..len)
        .map(|i| (seed.wrapping_add(i as u32).wrapping_mul(2654435761) >> 13) as u8)
        .collect()
}

pub fn content_type_for(kind: &str) -> &'static str {
    match kind {
        "jpeg" => "image/jpeg",
        "jpg" => "image/jpg",
        "gif" => "image/gif",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub const IMAGE_LEN: usize = 4096;
pub const LARGE_LEN: usize = 1024 * 1024;

/// Mock upstream image host. Returns its base URL.
pub async fn spawn_upstream() -> String {
    let app = Router::new()
        .route(
            "/image/:kind",
            get(|Path(kind): Path<String>| async move {
                Response::builder()
                    .header(header::CONTENT_TYPE, content_type_for(&kind))
                    .body(Body::from(image_bytes(&kind, IMAGE_LEN)))
                    .unwrap()
            }),
        )
        .route(
            "/large",
            get(|| async {
                let data = image_bytes("large", LARGE_LEN);
                let chunks: Vec<Result<Bytes, io::Error>> = data
                    .chunks(8 * 1024)
                    .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                    .collect();
                Response::builder()
                    .header(header::CONTENT_TYPE, "image/png")
                    .body(Body::from_stream(stream::iter(chunks)))
                    .unwrap()
            }),
        )
        .route(
            "/no-content-type",
            get(|| async {
                Response::builder()
                    .body(Body::from(image_bytes("bare", 64)))
                    .unwrap()
            }),
        )
        .route(
            "/not-found",
            get(|| async {
                Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .header(header::CONTENT_TYPE, "text/html")
                    .body(Body::from("<h1>gone</h1>"))
                    .unwrap()
            }),
        )
        .route(
            "/broken",
            get(|| async {
                let chunks: Vec<Result<Bytes, io::Error>> = vec![
                    Ok(Bytes::from(image_bytes("broken", 1024))),
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "upstream died")),
                ];
                Response::builder()
                    .header(header::CONTENT_TYPE, "image/gif")
                    .body(Body::from_stream(stream::iter(chunks)))
                    .unwrap()
            }),
        )
        .route(
            "/first-error",
            get(|| async {
                let chunks: Vec<Result<Bytes, io::Error>> = vec![Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "upstream died",
                ))];
                Response::builder()
                    .header(header::CONTENT_TYPE, "image/png")
                    .body(Body::from_stream(stream::iter(chunks)))
                    .unwrap()
            }),
        );

    let addr = spawn(app).await;
    format!("http://{}", addr)
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve(listener, app, std::future::pending()).await.unwrap();
    });
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .no_proxy()
        .build()
        .unwrap()
}
