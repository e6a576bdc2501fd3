use crate::core::scoring::{Factor, FactorBreakdown};
use crate::models::Priority;

/// Reason used when no factor stands out
pub const GENERIC_REASON: &str = "A solid all-round option for your family.";

/// Family score from which the baseline is phrased as "top-rated"
const TOP_RATED_FAMILY_SCORE: f64 = 8.0;

/// A second factor is only mentioned when it is at least this share of the first
const PAIR_THRESHOLD: f64 = 0.5;

/// Render a short explanation from the dominant factors
///
/// Picks the largest contribution, plus the runner-up when it is close enough.
/// Equal contributions are ordered age, budget, skill, priorities, base.
pub fn build_match_reason(breakdown: &FactorBreakdown) -> String {
    let mut ranked: Vec<(Factor, f64)> = breakdown
        .contributions()
        .into_iter()
        .filter(|(factor, value)| {
            // The neutral fallback baseline says nothing about the resort
            value.is_finite()
                && *value > 0.0
                && !(*factor == Factor::Base && breakdown.family_score.is_none())
        })
        .collect();

    // Stable sort keeps the tie-break order of `contributions()`
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let Some(&(top, top_value)) = ranked.first() else {
        return GENERIC_REASON.to_string();
    };

    let mut fragments = vec![fragment(top, breakdown)];
    if let Some(&(second, second_value)) = ranked.get(1) {
        if second_value >= top_value * PAIR_THRESHOLD {
            fragments.push(fragment(second, breakdown));
        }
    }

    format!("{}.", capitalize(&fragments.join(" and ")))
}

fn fragment(factor: Factor, breakdown: &FactorBreakdown) -> String {
    match factor {
        Factor::Age => "great for your kids' ages".to_string(),
        Factor::Budget if breakdown.budget_exact => "a fit for your budget".to_string(),
        Factor::Budget => "close to your budget".to_string(),
        Factor::Skill => "terrain that suits your family's skill level".to_string(),
        Factor::Priorities => format!("strong on {}", join_labels(&breakdown.matched_priorities)),
        Factor::Base => match breakdown.family_score {
            Some(score) if score >= TOP_RATED_FAMILY_SCORE => "one of our top-rated family resorts".to_string(),
            _ => "a well-rounded family resort".to_string(),
        },
    }
}

fn join_labels(tags: &[Priority]) -> String {
    let labels: Vec<&str> = tags.iter().map(|t| t.label()).collect();
    match labels.as_slice() {
        [] => "what matters to you".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} & {}", init.join(", "), last),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
