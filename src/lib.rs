//! Snow Match - quiz scoring and resort matching for the family ski-resort guide
//!
//! This library turns a family's quiz answers and a catalog of published
//! resorts into ranked recommendations and a snow personality.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{classify, get_initial_answers, AnswerUpdate, Personality, QuizMatcher};
pub use crate::models::{QuizAnswers, QuizResult, ResortForScoring, ResortMatch, ScoringWeights};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let result = QuizMatcher::default().compute_results(&get_initial_answers(), &[]);
        assert!(result.top_matches.is_empty());
    }
}
