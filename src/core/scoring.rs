use crate::core::reasons::build_match_reason;
use crate::models::{AgeBracket, PriceLevel, Priority, QuizAnswers, ResortForScoring, ScoringWeights, SkillLevel};

/// Family score used when a resort has none on record
pub const NEUTRAL_FAMILY_SCORE: f64 = 5.0;

/// Resolution match scores are rounded to, so equal scores compare exactly
const SCORE_RESOLUTION: f64 = 1_000_000.0;

// Thresholds for priority signals
const SCORE_SIGNAL_THRESHOLD: f64 = 7.0;
const NIGHTLIFE_THRESHOLD: f64 = 6.0;
const NON_SKI_ACTIVITIES_THRESHOLD: u32 = 5;
const TERRAIN_PARK_ADVANCED_PCT: f64 = 30.0;

/// Scoring factors, listed in tie-break order for match reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Age,
    Budget,
    Skill,
    Priorities,
    Base,
}

/// Weighted contribution of every factor to one resort's score
#[derive(Debug, Clone, PartialEq)]
pub struct FactorBreakdown {
    pub age: f64,
    pub budget: f64,
    pub skill: f64,
    pub priorities: f64,
    pub base: f64,
    /// Theoretical maximum for the given answers
    pub max: f64,
    pub budget_exact: bool,
    pub matched_priorities: Vec<Priority>,
    /// `None` when the neutral fallback was used
    pub family_score: Option<f64>,
}

impl FactorBreakdown {
    pub fn total(&self) -> f64 {
        self.age + self.budget + self.skill + self.priorities + self.base
    }

    /// Contributions in tie-break order
    pub fn contributions(&self) -> [(Factor, f64); 5] {
        [
            (Factor::Age, self.age),
            (Factor::Budget, self.budget),
            (Factor::Skill, self.skill),
            (Factor::Priorities, self.priorities),
            (Factor::Base, self.base),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResortScore {
    /// Normalized score in [0, 1]
    pub match_score: f64,
    pub match_reason: String,
    pub breakdown: FactorBreakdown,
}

/// Score a resort against the quiz answers
///
/// Scoring formula (each fit in [0, 1]):
/// total = (
///     age_fit * age +                    # Bracket overlap with best ages
///     budget_fit * budget +              # Exact tier, partial for adjacent
///     skill_fit * skill +                # Terrain mix vs skill level
///     matched_tags * priority_bonus +    # Per satisfied priority tag
///     family_score / 10 * family         # Baseline
/// )
/// score = total / max, where max only counts the factors the answers carry a
/// signal for.
///
/// Never fails: missing or non-finite resort attributes contribute nothing.
pub fn calculate_match_score(
    resort: &ResortForScoring,
    answers: &QuizAnswers,
    weights: &ScoringWeights,
) -> ResortScore {
    let breakdown = calculate_breakdown(resort, answers, weights);

    let raw = if breakdown.max > 0.0 {
        breakdown.total() / breakdown.max
    } else {
        0.0
    };
    // Comparison excludes NaN and folds -0.0 into 0.0
    let match_score = if raw > 0.0 {
        (raw.min(1.0) * SCORE_RESOLUTION).round() / SCORE_RESOLUTION
    } else {
        0.0
    };

    let match_reason = build_match_reason(&breakdown);

    ResortScore {
        match_score,
        match_reason,
        breakdown,
    }
}

/// Compute the weighted factor contributions without normalizing
pub fn calculate_breakdown(
    resort: &ResortForScoring,
    answers: &QuizAnswers,
    weights: &ScoringWeights,
) -> FactorBreakdown {
    let family_score = metric(resort.family_score, 10.0);
    let family_fit = family_score.unwrap_or(NEUTRAL_FAMILY_SCORE) / 10.0;

    let mut breakdown = FactorBreakdown {
        age: 0.0,
        budget: 0.0,
        skill: 0.0,
        priorities: 0.0,
        base: family_fit * weights.family,
        max: weights.family,
        budget_exact: false,
        matched_priorities: Vec::new(),
        family_score,
    };

    if let Some(ages) = answers.ages {
        breakdown.age = age_fit(ages, resort.best_age_min, resort.best_age_max) * weights.age;
        breakdown.max += weights.age;
    }

    if let Some(budget) = answers.budget {
        let fit = budget_fit(budget, resort.price_level, weights.adjacent_budget_credit);
        breakdown.budget = fit * weights.budget;
        breakdown.budget_exact = resort.price_level == Some(budget);
        breakdown.max += weights.budget;
    }

    if let Some(skill) = answers.skill {
        breakdown.skill = skill_fit(skill, resort) * weights.skill;
        breakdown.max += weights.skill;
    }

    for tag in &answers.priorities {
        breakdown.max += weights.priority_bonus;
        if priority_satisfied(*tag, resort) {
            breakdown.priorities += weights.priority_bonus;
            breakdown.matched_priorities.push(*tag);
        }
    }

    breakdown
}

/// Drop non-finite values and clamp to [0, max]
#[inline]
fn metric(value: Option<f64>, max: f64) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| v.clamp(0.0, max))
}

/// Share of the bracket's ages covered by the resort's best-age range (0-1)
///
/// Full containment scores 1, disjoint ranges score 0.
#[inline]
fn age_fit(bracket: AgeBracket, best_min: Option<u8>, best_max: Option<u8>) -> f64 {
    let (Some(a), Some(b)) = (best_min, best_max) else {
        return 0.0;
    };
    let (resort_min, resort_max) = if a <= b { (a, b) } else { (b, a) };
    let (lo, hi) = bracket.range();

    let start = lo.max(resort_min) as i32;
    let end = hi.min(resort_max) as i32;
    let overlap = end - start + 1;
    if overlap <= 0 {
        return 0.0;
    }

    overlap as f64 / (hi - lo + 1) as f64
}

/// Budget score (0-1): exact tier is 1, one tier away gets partial credit
#[inline]
fn budget_fit(budget: PriceLevel, price_level: Option<PriceLevel>, adjacent_credit: f64) -> f64 {
    match price_level.map(|level| level.steps_from(budget)) {
        Some(0) => 1.0,
        Some(1) => adjacent_credit.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy)]
enum Terrain {
    Beginner,
    Advanced,
}

/// Minimum terrain share (percent) each skill level is looking for
fn terrain_expectations(skill: SkillLevel) -> &'static [(Terrain, f64)] {
    match skill {
        SkillLevel::FirstTimer => &[(Terrain::Beginner, 50.0)],
        SkillLevel::Beginner => &[(Terrain::Beginner, 35.0)],
        SkillLevel::Intermediate => &[(Terrain::Beginner, 20.0), (Terrain::Advanced, 20.0)],
        SkillLevel::Advanced => &[(Terrain::Advanced, 40.0)],
        SkillLevel::Mixed => &[(Terrain::Beginner, 30.0), (Terrain::Advanced, 25.0)],
    }
}

/// Terrain score (0-1): mean of how well each expected share is met
#[inline]
fn skill_fit(skill: SkillLevel, resort: &ResortForScoring) -> f64 {
    let expectations = terrain_expectations(skill);
    let sum: f64 = expectations
        .iter()
        .map(|(terrain, target)| {
            let actual = match terrain {
                Terrain::Beginner => metric(resort.beginner_terrain, 100.0),
                Terrain::Advanced => metric(resort.advanced_terrain, 100.0),
            };
            actual.map_or(0.0, |pct| (pct / target).min(1.0))
        })
        .sum();

    sum / expectations.len() as f64
}

/// Whether the resort carries the signal a priority tag asks for
///
/// Tags without a signal on the resort are simply not satisfied.
pub fn priority_satisfied(tag: Priority, resort: &ResortForScoring) -> bool {
    let at_least = |value: Option<f64>, threshold: f64| {
        metric(value, 10.0).is_some_and(|v| v >= threshold)
    };

    match tag {
        Priority::Childcare => {
            resort.has_childcare.unwrap_or(false) || resort.has_ski_school.unwrap_or(false)
        }
        Priority::TerrainPark => metric(resort.advanced_terrain, 100.0)
            .is_some_and(|pct| pct >= TERRAIN_PARK_ADVANCED_PCT),
        Priority::Nightlife => at_least(resort.nightlife_score, NIGHTLIFE_THRESHOLD),
        Priority::Value => resort
            .price_level
            .is_some_and(|level| level <= PriceLevel::Moderate),
        Priority::Convenience => resort.has_ski_in_out.unwrap_or(false),
        Priority::SnowReliability => at_least(resort.snow_reliability, SCORE_SIGNAL_THRESHOLD),
        Priority::NonSkiActivities => resort
            .non_ski_activities
            .is_some_and(|count| count >= NON_SKI_ACTIVITIES_THRESHOLD),
        Priority::EnglishFriendly => at_least(resort.english_friendly, SCORE_SIGNAL_THRESHOLD),
        Priority::VillageCharm => at_least(resort.village_charm, SCORE_SIGNAL_THRESHOLD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_resort(best_age: (u8, u8), price: PriceLevel, beginner: f64, advanced: f64) -> ResortForScoring {
        ResortForScoring {
            family_score: Some(8.0),
            best_age_min: Some(best_age.0),
            best_age_max: Some(best_age.1),
            price_level: Some(price),
            beginner_terrain: Some(beginner),
            advanced_terrain: Some(advanced),
            ..ResortForScoring::bare("r1", "Test Resort", "test-resort", "Austria", "Tyrol")
        }
    }

    fn create_test_answers() -> QuizAnswers {
        QuizAnswers {
            ages: Some(AgeBracket::Young),
            skill: Some(SkillLevel::Beginner),
            budget: Some(PriceLevel::Moderate),
            priorities: vec![],
        }
    }

    #[test]
    fn test_negative_total_scores_positive_zero() {
        let weights = ScoringWeights {
            age: -0.3,
            ..ScoringWeights::default()
        };
        let resort = create_test_resort((4, 7), PriceLevel::Luxury, 0.0, 0.0);

        let score = calculate_match_score(&resort, &create_test_answers(), &weights);

        assert_eq!(score.match_score, 0.0);
        assert!(score.match_score.is_sign_positive());
    }

    #[test]
    fn test_age_fit() {
        // Full containment
        assert_eq!(age_fit(AgeBracket::Young, Some(4), Some(8)), 1.0);
        // Partial overlap: 6 and 7 out of 4..=7
        assert_eq!(age_fit(AgeBracket::Young, Some(6), Some(10)), 0.5);
        // Disjoint
        assert_eq!(age_fit(AgeBracket::Young, Some(13), Some(17)), 0.0);
        // Missing
        assert_eq!(age_fit(AgeBracket::Young, None, Some(8)), 0.0);
        // Inverted range is read as its sorted form
        assert_eq!(age_fit(AgeBracket::Young, Some(8), Some(4)), 1.0);
    }

    #[test]
    fn test_budget_fit() {
        assert_eq!(budget_fit(PriceLevel::Moderate, Some(PriceLevel::Moderate), 0.5), 1.0);
        assert_eq!(budget_fit(PriceLevel::Moderate, Some(PriceLevel::Premium), 0.5), 0.5);
        assert_eq!(budget_fit(PriceLevel::Moderate, Some(PriceLevel::Budget), 0.5), 0.5);
        assert_eq!(budget_fit(PriceLevel::Moderate, Some(PriceLevel::Luxury), 0.5), 0.0);
        assert_eq!(budget_fit(PriceLevel::Moderate, None, 0.5), 0.0);
    }

    #[test]
    fn test_skill_fit() {
        let resort = create_test_resort((4, 8), PriceLevel::Moderate, 60.0, 10.0);
        assert_eq!(skill_fit(SkillLevel::FirstTimer, &resort), 1.0);
        assert_eq!(skill_fit(SkillLevel::Advanced, &resort), 0.25);

        let steep = create_test_resort((10, 17), PriceLevel::Luxury, 5.0, 50.0);
        assert!(skill_fit(SkillLevel::Advanced, &steep) > skill_fit(SkillLevel::Beginner, &steep));
    }

    #[test]
    fn test_score_within_bounds() {
        let resort = create_test_resort((4, 8), PriceLevel::Moderate, 60.0, 10.0);
        let score = calculate_match_score(&resort, &create_test_answers(), &ScoringWeights::default());
        assert!(score.match_score >= 0.0 && score.match_score <= 1.0);
    }

    #[test]
    fn test_perfect_match_scores_near_top() {
        let mut resort = create_test_resort((4, 8), PriceLevel::Moderate, 60.0, 10.0);
        resort.family_score = Some(10.0);
        let score = calculate_match_score(&resort, &create_test_answers(), &ScoringWeights::default());
        assert_eq!(score.match_score, 1.0);
    }

    #[test]
    fn test_priority_bonus_only_when_signal_present() {
        let mut resort = create_test_resort((4, 8), PriceLevel::Moderate, 60.0, 10.0);
        resort.has_ski_school = Some(true);

        let mut answers = create_test_answers();
        answers.priorities = vec![Priority::Childcare, Priority::Nightlife];

        let score = calculate_match_score(&resort, &answers, &ScoringWeights::default());
        assert_eq!(score.breakdown.matched_priorities, vec![Priority::Childcare]);
        assert!((score.breakdown.priorities - 0.05).abs() < 1e-12);
        assert!((score.breakdown.max - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_priority_signals() {
        let mut resort = ResortForScoring::bare("r", "R", "r", "", "");
        assert!(!priority_satisfied(Priority::Convenience, &resort));

        resort.has_ski_in_out = Some(true);
        resort.price_level = Some(PriceLevel::Budget);
        resort.nightlife_score = Some(6.0);
        resort.non_ski_activities = Some(4);
        resort.village_charm = Some(f64::NAN);

        assert!(priority_satisfied(Priority::Convenience, &resort));
        assert!(priority_satisfied(Priority::Value, &resort));
        assert!(priority_satisfied(Priority::Nightlife, &resort));
        assert!(!priority_satisfied(Priority::NonSkiActivities, &resort));
        assert!(!priority_satisfied(Priority::VillageCharm, &resort));
    }

    #[test]
    fn test_missing_family_score_uses_neutral_baseline() {
        let resort = ResortForScoring::bare("r", "R", "r", "", "");
        let score = calculate_match_score(&resort, &QuizAnswers::initial(), &ScoringWeights::default());

        assert_eq!(score.breakdown.family_score, None);
        assert_eq!(score.match_score, 0.5);
    }

    #[test]
    fn test_zero_weights_do_not_divide_by_zero() {
        let weights = ScoringWeights {
            age: 0.0,
            budget: 0.0,
            skill: 0.0,
            family: 0.0,
            priority_bonus: 0.0,
            adjacent_budget_credit: 0.0,
        };
        let resort = create_test_resort((4, 8), PriceLevel::Moderate, 60.0, 10.0);
        let score = calculate_match_score(&resort, &create_test_answers(), &weights);
        assert_eq!(score.match_score, 0.0);
    }
}
