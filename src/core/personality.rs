use serde::{Deserialize, Serialize};
use crate::models::{PersonalityProfile, PriceLevel, Priority, QuizAnswers, SkillLevel};

/// The fixed catalog of snow personalities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Personality {
    PowderSeeker,
    FirstTracks,
    LuxuryLounger,
    BudgetAdventurer,
    ComfortCruiser,
    BalancedFamily,
}

impl Personality {
    pub const ALL: [Personality; 6] = [
        Self::PowderSeeker,
        Self::FirstTracks,
        Self::LuxuryLounger,
        Self::BudgetAdventurer,
        Self::ComfortCruiser,
        Self::BalancedFamily,
    ];

    pub fn profile(self) -> PersonalityProfile {
        let (title, emoji, description, tagline, traits, color, color_dark): (
            &str,
            &str,
            &str,
            &str,
            &[&str],
            &str,
            &str,
        ) = match self {
            Self::PowderSeeker => (
                "Powder Seeker",
                "🏔️",
                "Your crew lives for steep lines, fresh snow and the first chair of the day.",
                "Earn your turns, then do it again.",
                &["Adventurous", "Early riser", "Terrain hungry"],
                "#2563eb",
                "#1e3a8a",
            ),
            Self::FirstTracks => (
                "First Tracks Family",
                "🌱",
                "This is your first winter on skis, and you want gentle slopes and patient instructors.",
                "Every expert was once a beginner.",
                &["Curious", "Patient", "Ski-school ready"],
                "#16a34a",
                "#14532d",
            ),
            Self::LuxuryLounger => (
                "Luxury Lounger",
                "🥂",
                "You want slope-side lodging and a fireplace waiting at the end of the day.",
                "Ski a little, lounge a lot.",
                &["Comfort first", "Slope-side", "Five-star"],
                "#a855f7",
                "#581c87",
            ),
            Self::BudgetAdventurer => (
                "Budget Adventurer",
                "🎒",
                "You find mountains with great snow that don't cost a fortune.",
                "Big mountains, small bills.",
                &["Resourceful", "Deal hunter", "Flexible"],
                "#f59e0b",
                "#78350f",
            ),
            Self::ComfortCruiser => (
                "Comfort Cruiser",
                "🧸",
                "Easy logistics, reliable childcare and cruisy blues keep your whole family happy.",
                "Happy kids, relaxed parents.",
                &["Organized", "Family first", "Stress-free"],
                "#ec4899",
                "#831843",
            ),
            Self::BalancedFamily => (
                "Balanced Family",
                "⛷️",
                "You want a bit of everything: good snow, fun for the kids and something for the grown-ups.",
                "Something for everyone.",
                &["Easygoing", "Well-rounded", "Open to anything"],
                "#0ea5e9",
                "#0c4a6e",
            ),
        };

        PersonalityProfile {
            title: title.to_string(),
            emoji: emoji.to_string(),
            description: description.to_string(),
            tagline: tagline.to_string(),
            traits: traits.iter().map(|t| t.to_string()).collect(),
            color: color.to_string(),
            color_dark: color_dark.to_string(),
        }
    }
}

/// Classify answers into exactly one personality
///
/// Rules are checked in order and the first match wins:
/// 1. advanced skiers → Powder Seeker
/// 2. first-timers → First Tracks Family
/// 3. `$$$$` budget, or convenience + village charm → Luxury Lounger
/// 4. `$` budget, or value → Budget Adventurer
/// 5. terrain park or snow reliability → Powder Seeker
/// 6. childcare or convenience → Comfort Cruiser
/// 7. anything else → Balanced Family
pub fn classify(answers: &QuizAnswers) -> Personality {
    match answers.skill {
        Some(SkillLevel::Advanced) => return Personality::PowderSeeker,
        Some(SkillLevel::FirstTimer) => return Personality::FirstTracks,
        _ => {}
    }

    let has = |tag| answers.has_priority(tag);

    if answers.budget == Some(PriceLevel::Luxury)
        || (has(Priority::Convenience) && has(Priority::VillageCharm))
    {
        Personality::LuxuryLounger
    } else if answers.budget == Some(PriceLevel::Budget) || has(Priority::Value) {
        Personality::BudgetAdventurer
    } else if has(Priority::TerrainPark) || has(Priority::SnowReliability) {
        Personality::PowderSeeker
    } else if has(Priority::Childcare) || has(Priority::Convenience) {
        Personality::ComfortCruiser
    } else {
        Personality::BalancedFamily
    }
}

/// Classify answers and return the display profile
pub fn classify_profile(answers: &QuizAnswers) -> PersonalityProfile {
    classify(answers).profile()
}
