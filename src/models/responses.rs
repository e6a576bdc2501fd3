use serde::{Deserialize, Serialize};
use crate::models::domain::{QuizAnswers, QuizResult};

/// Response for the quiz results endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultsResponse {
    pub result_id: String,
    #[serde(flatten)]
    pub result: QuizResult,
    pub total_candidates: usize,
}

/// Updated answer state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswersResponse {
    pub answers: QuizAnswers,
    pub complete: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
