use serde::{Deserialize, Serialize};
use crate::core::answers::AnswerUpdate;
use crate::models::domain::QuizAnswers;

/// Request to compute quiz results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultsRequest {
    #[serde(default)]
    pub answers: QuizAnswers,
}

/// Request to apply a single step update to the client's answer state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyAnswerRequest {
    #[serde(default)]
    pub answers: QuizAnswers,
    pub update: AnswerUpdate,
}
