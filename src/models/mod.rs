// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AgeBracket, PersonalityProfile, Priority, PriceLevel, QuizAnswers, QuizResult, ResortForScoring,
    ResortMatch, ScoringWeights, SkillLevel,
};
pub use requests::{ApplyAnswerRequest, QuizResultsRequest};
pub use responses::{AnswersResponse, ErrorResponse, HealthResponse, QuizResultsResponse};
