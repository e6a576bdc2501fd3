use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use snow_match::config::{ContentStoreKind, ContentStoreSettings, LoggingSettings, Settings};
use snow_match::core::QuizMatcher;
use snow_match::routes::{self, AppState, TrustedProxies};
use snow_match::services::{KeyExpiryStore, MemoryStore, RateLimiter, RedisStore, ResortSource, StaticCatalog, SupabaseClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// Default catalog file for the file-backed content store
const DEFAULT_CATALOG_PATH: &str = "config/resorts.toml";

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(message: String) -> std::io::Error {
    error!("{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

/// LOG_LEVEL and LOG_FORMAT override the configured values
fn init_logging(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

/// Build the configured resort source
fn build_source(settings: &ContentStoreSettings) -> Result<Arc<dyn ResortSource>, std::io::Error> {
    match settings.kind {
        ContentStoreKind::Supabase => {
            let (Some(url), Some(key)) = (&settings.supabase_url, &settings.supabase_key) else {
                return Err(startup_error(
                    "Supabase content store requires supabase_url and supabase_key".to_string(),
                ));
            };

            let client = SupabaseClient::new(
                url.clone(),
                key.clone(),
                settings.resorts_table.clone(),
                settings.request_timeout_secs.unwrap_or(10),
            )
            .map_err(|e| startup_error(format!("Failed to create Supabase client: {}", e)))?;

            info!("Supabase client initialized (table: {})", settings.resorts_table);
            Ok(Arc::new(client))
        }
        ContentStoreKind::File => {
            let path = settings.catalog_path.as_deref().unwrap_or(DEFAULT_CATALOG_PATH);
            let catalog = StaticCatalog::load(path)
                .map_err(|e| startup_error(format!("Failed to load resort catalog {}: {}", path, e)))?;

            Ok(Arc::new(catalog))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to load configuration: {}", e),
        )
    })?;

    init_logging(&settings.logging);

    info!("Starting Snow Match quiz service...");

    let source = build_source(&settings.content_store)?;

    // Rate-limit store: Redis when configured, in-memory otherwise
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);
    let store: Arc<dyn KeyExpiryStore> = match &settings.cache.redis_url {
        Some(redis_url) => match RedisStore::connect(redis_url).await {
            Ok(store) => {
                info!("Rate limiting backed by Redis");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to connect to Redis ({}), rate limiting in memory", e);
                Arc::new(MemoryStore::new(l1_cache_size))
            }
        },
        None => {
            info!("Rate limiting in memory ({} keys)", l1_cache_size);
            Arc::new(MemoryStore::new(l1_cache_size))
        }
    };

    let limiter = RateLimiter::new(
        store,
        settings.rate_limit.max_requests,
        Duration::from_secs(settings.rate_limit.window_secs),
    );

    // Initialize matcher with configured weights
    let weights = settings.scoring_weights();
    let matcher = QuizMatcher::new(
        weights,
        settings.quiz.top_matches,
        settings.quiz.max_priorities,
    );

    info!("Matcher initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        source,
        limiter,
        matcher,
        trusted_proxies: TrustedProxies::new(settings.rate_limit.trusted_proxies.clone()),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
