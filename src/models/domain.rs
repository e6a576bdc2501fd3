use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Child age bracket selected in the first quiz step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "0-3")]
    Toddler,
    #[serde(rename = "4-7")]
    Young,
    #[serde(rename = "8-12")]
    Kids,
    #[serde(rename = "13+")]
    Teens,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [Self::Toddler, Self::Young, Self::Kids, Self::Teens];

    /// Inclusive age range covered by the bracket
    pub fn range(self) -> (u8, u8) {
        match self {
            Self::Toddler => (0, 3),
            Self::Young => (4, 7),
            Self::Kids => (8, 12),
            Self::Teens => (13, 17),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toddler => "0-3",
            Self::Young => "4-7",
            Self::Kids => "8-12",
            Self::Teens => "13+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillLevel {
    FirstTimer,
    Beginner,
    Intermediate,
    Advanced,
    Mixed,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 5] = [
        Self::FirstTimer,
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstTimer => "first-timer",
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Mixed => "mixed",
        }
    }
}

/// Price tier, shared by the budget answer and the resort's lodging cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceLevel {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Premium,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceLevel {
    pub const ALL: [PriceLevel; 4] = [Self::Budget, Self::Moderate, Self::Premium, Self::Luxury];

    /// Ordinal rank, 1 for `$` up to 4 for `$$$$`
    pub fn rank(self) -> u8 {
        match self {
            Self::Budget => 1,
            Self::Moderate => 2,
            Self::Premium => 3,
            Self::Luxury => 4,
        }
    }

    /// Number of tiers between two price levels
    pub fn steps_from(self, other: PriceLevel) -> u8 {
        self.rank().abs_diff(other.rank())
    }

    /// Derive a tier from the nightly lodging cost in dollars
    ///
    /// Breakpoints: <150 → `$`, <300 → `$$`, <500 → `$$$`, otherwise `$$$$`.
    pub fn from_nightly_cost(cost: f64) -> Option<Self> {
        if !cost.is_finite() || cost < 0.0 {
            return None;
        }

        Some(if cost < 150.0 {
            Self::Budget
        } else if cost < 300.0 {
            Self::Moderate
        } else if cost < 500.0 {
            Self::Premium
        } else {
            Self::Luxury
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "$",
            Self::Moderate => "$$",
            Self::Premium => "$$$",
            Self::Luxury => "$$$$",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value.trim())
    }
}

/// Priority tags a family can pick in the last quiz step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Childcare,
    TerrainPark,
    Nightlife,
    Value,
    Convenience,
    SnowReliability,
    NonSkiActivities,
    EnglishFriendly,
    VillageCharm,
}

impl Priority {
    pub const ALL: [Priority; 9] = [
        Self::Childcare,
        Self::TerrainPark,
        Self::Nightlife,
        Self::Value,
        Self::Convenience,
        Self::SnowReliability,
        Self::NonSkiActivities,
        Self::EnglishFriendly,
        Self::VillageCharm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Childcare => "childcare",
            Self::TerrainPark => "terrain-park",
            Self::Nightlife => "nightlife",
            Self::Value => "value",
            Self::Convenience => "convenience",
            Self::SnowReliability => "snow-reliability",
            Self::NonSkiActivities => "non-ski-activities",
            Self::EnglishFriendly => "english-friendly",
            Self::VillageCharm => "village-charm",
        }
    }

    /// Phrase used when the tag shows up in a match reason
    pub fn label(self) -> &'static str {
        match self {
            Self::Childcare => "childcare",
            Self::TerrainPark => "terrain parks",
            Self::Nightlife => "après-ski",
            Self::Value => "value",
            Self::Convenience => "ski-in/ski-out convenience",
            Self::SnowReliability => "snow reliability",
            Self::NonSkiActivities => "off-slope activities",
            Self::EnglishFriendly => "English-speaking staff",
            Self::VillageCharm => "village charm",
        }
    }
}

/// Normalized quiz answers
///
/// Single-select fields are `None` until answered. `priorities` is kept in
/// selection order and never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswers {
    #[serde(default)]
    pub ages: Option<AgeBracket>,
    #[serde(default)]
    pub skill: Option<SkillLevel>,
    #[serde(default)]
    pub budget: Option<PriceLevel>,
    #[serde(default)]
    pub priorities: Vec<Priority>,
}

/// Resort snapshot as consumed by the scoring engine
///
/// Every scoring attribute is optional; the engine treats missing values as
/// neutral instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_age_range"))]
pub struct ResortForScoring {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub slug: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub family_score: Option<f64>,
    #[serde(default)]
    pub best_age_min: Option<u8>,
    #[serde(default)]
    pub best_age_max: Option<u8>,
    #[serde(default)]
    pub price_level: Option<PriceLevel>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub beginner_terrain: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub advanced_terrain: Option<f64>,
    #[serde(default)]
    pub has_ski_school: Option<bool>,
    #[serde(default)]
    pub has_childcare: Option<bool>,
    #[serde(default)]
    pub has_ski_in_out: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub nightlife_score: Option<f64>,
    #[serde(default)]
    pub non_ski_activities: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub english_friendly: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub snow_reliability: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 10.0))]
    pub village_charm: Option<f64>,
}

impl ResortForScoring {
    /// Resort with identity fields only, every metric absent
    pub fn bare(id: &str, name: &str, slug: &str, country: &str, region: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            country: country.to_string(),
            region: region.to_string(),
            ..Self::default()
        }
    }
}

fn validate_age_range(resort: &ResortForScoring) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (resort.best_age_min, resort.best_age_max) {
        if min > max {
            return Err(ValidationError::new("best_age_min_exceeds_max"));
        }
    }
    Ok(())
}

/// Scored resort returned to the results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResortMatch {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub country: String,
    pub region: String,
    pub match_score: f64,
    pub match_reason: String,
    pub family_score: Option<f64>,
    pub best_age_min: Option<u8>,
    pub best_age_max: Option<u8>,
    pub price_level: Option<PriceLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityProfile {
    pub title: String,
    pub emoji: String,
    pub description: String,
    pub tagline: String,
    pub traits: Vec<String>,
    pub color: String,
    pub color_dark: String,
}

/// Aggregate produced for one completed quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub answers: QuizAnswers,
    pub personality: PersonalityProfile,
    pub top_matches: Vec<ResortMatch>,
}

/// Scoring weights
///
/// `priority_bonus` is awarded per selected tag the resort satisfies and
/// `adjacent_budget_credit` is the fraction of the budget weight granted for a
/// tier one step away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub age: f64,
    pub budget: f64,
    pub skill: f64,
    pub family: f64,
    pub priority_bonus: f64,
    pub adjacent_budget_credit: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            age: 0.30,
            budget: 0.20,
            skill: 0.20,
            family: 0.15,
            priority_bonus: 0.05,
            adjacent_budget_credit: 0.5,
        }
    }
}
