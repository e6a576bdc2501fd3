use actix_web::{web, HttpRequest, HttpResponse, Responder};
use crate::core::{quiz_questions, QuizMatcher};
use crate::models::{AnswersResponse, ApplyAnswerRequest, ErrorResponse, HealthResponse, QuizResultsRequest, QuizResultsResponse};
use crate::services::{RateLimiter, ResortSource};
use std::net::IpAddr;
use std::sync::Arc;

/// Rate-limit scope for result computation
const RESULTS_SCOPE: &str = "quiz-results";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ResortSource>,
    pub limiter: RateLimiter,
    pub matcher: QuizMatcher,
    pub trusted_proxies: TrustedProxies,
}

/// Peers allowed to name the client through forwarding headers
///
/// Forwarded / X-Forwarded-For are client-controlled, so they only count
/// when the socket peer is one of these proxies.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Vec<IpAddr>);

impl TrustedProxies {
    pub fn new(proxies: Vec<IpAddr>) -> Self {
        Self(proxies)
    }

    /// Address used to key per-client rate limits
    pub fn client_addr(&self, req: &HttpRequest) -> String {
        match req.peer_addr().map(|addr| addr.ip()) {
            Some(peer) if self.0.contains(&peer) => req
                .connection_info()
                .realip_remote_addr()
                .map(str::to_string)
                .unwrap_or_else(|| peer.to_string()),
            Some(peer) => peer.to_string(),
            None => "unknown".to_string(),
        }
    }
}

/// Configure all quiz-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/quiz/questions", web::get().to(get_questions))
        .route("/quiz/answers", web::post().to(apply_answer))
        .route("/quiz/results", web::post().to(compute_results));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Question catalog for the multi-step form
///
/// GET /api/v1/quiz/questions
async fn get_questions(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(quiz_questions(state.matcher.max_priorities()))
}

/// Apply one step update to the caller's answer state
///
/// POST /api/v1/quiz/answers
///
/// Request body:
/// ```json
/// {
///   "answers": { "ages": "4-7", "priorities": ["childcare"] },
///   "update": { "field": "toggle-priority", "value": "value" }
/// }
/// ```
async fn apply_answer(
    state: web::Data<AppState>,
    req: web::Json<ApplyAnswerRequest>,
) -> impl Responder {
    let ApplyAnswerRequest { answers, update } = req.into_inner();
    let max = state.matcher.max_priorities();

    let mut answers = answers.normalized(max);
    answers.apply(update, max);

    HttpResponse::Ok().json(AnswersResponse {
        complete: answers.is_complete(),
        answers,
    })
}

/// Compute quiz results endpoint
///
/// POST /api/v1/quiz/results
///
/// Request body:
/// ```json
/// {
///   "answers": {
///     "ages": "4-7",
///     "skill": "beginner",
///     "budget": "$$",
///     "priorities": ["childcare", "convenience"]
///   }
/// }
/// ```
async fn compute_results(
    state: web::Data<AppState>,
    req: web::Json<QuizResultsRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let client = state.trusted_proxies.client_addr(&http_req);

    match state.limiter.check(RESULTS_SCOPE, &client).await {
        Ok(decision) if !decision.allowed => {
            tracing::info!("Rate limited quiz results for {}", client);
            return HttpResponse::TooManyRequests()
                .insert_header(("Retry-After", state.limiter.window().as_secs().to_string()))
                .json(ErrorResponse {
                    error: "Too many requests".to_string(),
                    message: "Please wait a moment before trying again".to_string(),
                    status_code: 429,
                });
        }
        Ok(_) => {}
        Err(e) => {
            // Fail open: a store outage must not take the quiz down
            tracing::warn!("Rate limit store unavailable, allowing request: {}", e);
        }
    }

    let resorts = match state.source.published_resorts().await {
        Ok(resorts) => resorts,
        Err(e) => {
            tracing::error!("Failed to fetch resorts from {}: {}", state.source.name(), e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to fetch resorts".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    let total_candidates = resorts.len();
    let result = state.matcher.compute_results(&req.answers, &resorts);
    let result_id = uuid::Uuid::new_v4().to_string();

    let top_slugs: Vec<&str> = result.top_matches.iter().map(|m| m.slug.as_str()).collect();
    tracing::info!(
        event = "quiz_completed",
        result_id = %result_id,
        personality = %result.personality.title,
        top_matches = ?top_slugs,
        total_candidates,
        "Computed quiz results"
    );

    HttpResponse::Ok().json(QuizResultsResponse {
        result_id,
        result,
        total_candidates,
    })
}
