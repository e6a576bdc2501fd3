use crate::core::{
    answers::DEFAULT_MAX_PRIORITIES,
    personality::classify_profile,
    scoring::calculate_match_score,
};
use crate::models::{QuizAnswers, QuizResult, ResortForScoring, ResortMatch, ScoringWeights};

/// Default number of resorts returned per quiz
pub const DEFAULT_TOP_MATCHES: usize = 3;

/// Quiz results orchestrator
///
/// # Pipeline Stages
/// 1. Normalize answers (dedupe and cap priorities)
/// 2. Score every resort, no pre-filtering
/// 3. Stable sort by score, descending
/// 4. Truncate to the top matches and attach the personality
#[derive(Debug, Clone)]
pub struct QuizMatcher {
    weights: ScoringWeights,
    top_matches: usize,
    max_priorities: usize,
}

impl QuizMatcher {
    pub fn new(weights: ScoringWeights, top_matches: usize, max_priorities: usize) -> Self {
        Self {
            weights,
            top_matches,
            max_priorities,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default(), DEFAULT_TOP_MATCHES, DEFAULT_MAX_PRIORITIES)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn max_priorities(&self) -> usize {
        self.max_priorities
    }

    /// Produce the quiz result for a set of answers
    ///
    /// # Arguments
    /// * `answers` - The quiz taker's answers, normalized before use
    /// * `resorts` - Published resorts fetched by the caller
    ///
    /// # Returns
    /// QuizResult with at most `top_matches` resorts, never padded
    pub fn compute_results(&self, answers: &QuizAnswers, resorts: &[ResortForScoring]) -> QuizResult {
        let answers = answers.normalized(self.max_priorities);

        QuizResult {
            personality: classify_profile(&answers),
            top_matches: self.rank_resorts(&answers, resorts),
            answers,
        }
    }

    /// Score, sort and truncate resorts
    ///
    /// Resorts with equal scores keep their input order.
    pub fn rank_resorts(&self, answers: &QuizAnswers, resorts: &[ResortForScoring]) -> Vec<ResortMatch> {
        let mut matches: Vec<ResortMatch> = resorts
            .iter()
            .map(|resort| {
                let score = calculate_match_score(resort, answers, &self.weights);

                ResortMatch {
                    id: resort.id.clone(),
                    name: resort.name.clone(),
                    slug: resort.slug.clone(),
                    country: resort.country.clone(),
                    region: resort.region.clone(),
                    match_score: score.match_score,
                    match_reason: score.match_reason,
                    family_score: resort.family_score,
                    best_age_min: resort.best_age_min,
                    best_age_max: resort.best_age_max,
                    price_level: resort.price_level,
                }
            })
            .collect();

        // sort_by is stable; scores are already rounded so ties compare equal
        matches.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

        matches.truncate(self.top_matches);

        tracing::debug!(
            "Ranked {} resorts, returning {}",
            resorts.len(),
            matches.len()
        );

        matches
    }
}

impl Default for QuizMatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
