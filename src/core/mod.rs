// Core algorithm exports
pub mod answers;
pub mod matcher;
pub mod personality;
pub mod reasons;
pub mod scoring;

pub use answers::{get_initial_answers, quiz_questions, AnswerUpdate, QuizQuestion, DEFAULT_MAX_PRIORITIES};
pub use matcher::{QuizMatcher, DEFAULT_TOP_MATCHES};
pub use personality::{classify, classify_profile, Personality};
pub use scoring::{calculate_match_score, priority_satisfied, FactorBreakdown, ResortScore};
