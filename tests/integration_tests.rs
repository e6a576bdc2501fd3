// Integration tests for Snow Match

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use snow_match::core::QuizMatcher;
use snow_match::models::{AgeBracket, PriceLevel, QuizAnswers, ResortForScoring, SkillLevel};
use snow_match::routes::{configure_routes, AppState, TrustedProxies};
use snow_match::services::{
    CatalogError, MemoryStore, RateLimiter, ResortSource, ResortSourceError, StaticCatalog,
};
use std::sync::Arc;
use std::time::Duration;

fn create_resort(id: &str, family_score: f64, price: PriceLevel) -> ResortForScoring {
    ResortForScoring {
        family_score: Some(family_score),
        best_age_min: Some(4),
        best_age_max: Some(10),
        price_level: Some(price),
        beginner_terrain: Some(45.0),
        advanced_terrain: Some(15.0),
        has_ski_school: Some(true),
        ..ResortForScoring::bare(id, &format!("Resort {}", id), id, "France", "Savoie")
    }
}

fn app_state(source: Arc<dyn ResortSource>, max_requests: u64) -> AppState {
    AppState {
        source,
        limiter: RateLimiter::new(Arc::new(MemoryStore::new(100)), max_requests, Duration::from_secs(60)),
        matcher: QuizMatcher::with_defaults(),
        trusted_proxies: TrustedProxies::default(),
    }
}

fn catalog(count: usize) -> Arc<dyn ResortSource> {
    let resorts = (0..count)
        .map(|i| create_resort(&format!("resort-{}", i), 5.0 + i as f64 / 2.0, PriceLevel::Moderate))
        .collect();
    Arc::new(StaticCatalog::new(resorts))
}

struct FailingSource;

#[async_trait]
impl ResortSource for FailingSource {
    async fn published_resorts(&self) -> Result<Vec<ResortForScoring>, ResortSourceError> {
        Err(CatalogError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).into())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn results_body() -> Value {
    json!({
        "answers": {
            "ages": "4-7",
            "skill": "beginner",
            "budget": "$$",
            "priorities": ["childcare"]
        }
    })
}

#[actix_web::test]
async fn test_integration_end_to_end_results() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(catalog(6), 10)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/quiz/results")
        .set_json(results_body())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert!(body["resultId"].as_str().is_some());
    assert_eq!(body["totalCandidates"], 6);
    assert_eq!(body["personality"]["title"], "Comfort Cruiser");

    let matches = body["topMatches"].as_array().unwrap();
    assert_eq!(matches.len(), 3);
    // Highest family score wins when everything else is equal
    assert_eq!(matches[0]["slug"], "resort-5");

    for pair in matches.windows(2) {
        assert!(pair[0]["matchScore"].as_f64() >= pair[1]["matchScore"].as_f64());
    }
}

#[actix_web::test]
async fn test_empty_catalog_returns_no_matches() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(catalog(0), 10)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/quiz/results")
        .set_json(json!({ "answers": {} }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["topMatches"], json!([]));
    assert_eq!(body["personality"]["title"], "Balanced Family");
}

#[actix_web::test]
async fn test_source_failure_is_bad_gateway() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(Arc::new(FailingSource), 10)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/quiz/results")
        .set_json(results_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 502);
}

#[actix_web::test]
async fn test_results_are_rate_limited() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(catalog(2), 1)))
            .configure(configure_routes),
    )
    .await;

    let first = test::TestRequest::post()
        .uri("/api/v1/quiz/results")
        .set_json(results_body())
        .to_request();
    assert!(test::call_service(&app, first).await.status().is_success());

    let second = test::TestRequest::post()
        .uri("/api/v1/quiz/results")
        .set_json(results_body())
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert_eq!(resp.status().as_u16(), 429);
    assert!(resp.headers().contains_key("retry-after"));
}

#[actix_web::test]
async fn test_rotating_forwarded_for_does_not_reset_limit() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(catalog(2), 1)))
            .configure(configure_routes),
    )
    .await;

    let mut statuses = Vec::new();
    for i in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/v1/quiz/results")
            .peer_addr("10.0.0.1:40000".parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("1.2.3.{}", i)))
            .set_json(results_body())
            .to_request();
        statuses.push(test::call_service(&app, req).await.status().as_u16());
    }

    assert_eq!(statuses, vec![200, 429, 429, 429, 429]);
}

#[actix_web::test]
async fn test_trusted_proxy_forwards_client_address() {
    let state = AppState {
        trusted_proxies: TrustedProxies::new(vec!["10.0.0.1".parse().unwrap()]),
        ..app_state(catalog(2), 1)
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    for i in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/v1/quiz/results")
            .peer_addr("10.0.0.1:40000".parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("1.2.3.{}", i)))
            .set_json(results_body())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
}

#[actix_web::test]
async fn test_apply_answer_toggles_priority() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(catalog(1), 10)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/quiz/answers")
        .set_json(json!({
            "answers": {
                "ages": "8-12",
                "skill": "mixed",
                "budget": "$$$",
                "priorities": ["childcare", "value", "nightlife"]
            },
            "update": { "field": "toggle-priority", "value": "convenience" }
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // Already at the cap, so the add is ignored
    assert_eq!(body["answers"]["priorities"], json!(["childcare", "value", "nightlife"]));
    assert_eq!(body["complete"], true);

    let answers: QuizAnswers = serde_json::from_value(body["answers"].clone()).unwrap();
    assert_eq!(answers.ages, Some(AgeBracket::Kids));
    assert_eq!(answers.skill, Some(SkillLevel::Mixed));
}

#[actix_web::test]
async fn test_questions_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(catalog(1), 10)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/quiz/questions").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 4);
    assert_eq!(questions[3]["id"], "priorities");
    assert_eq!(questions[3]["maxSelections"], 3);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(catalog(1), 10)))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[::core::prelude::v1::test]
fn test_catalog_file_loads() {
    let catalog = StaticCatalog::load("config/resorts.toml").unwrap();
    assert_eq!(catalog.len(), 5);
}
