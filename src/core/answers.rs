use serde::{Deserialize, Serialize};
use crate::models::{AgeBracket, PriceLevel, Priority, QuizAnswers, SkillLevel};

/// Default cap on selected priority tags
pub const DEFAULT_MAX_PRIORITIES: usize = 3;

/// A single quiz step interaction
///
/// Single-select updates always replace the previous value; priority updates
/// toggle membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "kebab-case")]
pub enum AnswerUpdate {
    Ages(AgeBracket),
    Skill(SkillLevel),
    Budget(PriceLevel),
    TogglePriority(Priority),
}

/// Empty answer set every quiz starts from
pub fn get_initial_answers() -> QuizAnswers {
    QuizAnswers::initial()
}

impl QuizAnswers {
    pub fn initial() -> Self {
        Self::default()
    }

    /// Apply one step update, never leaving the answers in an invalid state
    pub fn apply(&mut self, update: AnswerUpdate, max_selections: usize) {
        match update {
            AnswerUpdate::Ages(ages) => self.ages = Some(ages),
            AnswerUpdate::Skill(skill) => self.skill = Some(skill),
            AnswerUpdate::Budget(budget) => self.budget = Some(budget),
            AnswerUpdate::TogglePriority(tag) => {
                self.toggle_priority(tag, max_selections);
            }
        }
    }

    /// Toggle a priority tag
    ///
    /// Removes the tag if present, otherwise adds it while below the cap.
    /// Adds past the cap are ignored. Returns whether the set changed.
    pub fn toggle_priority(&mut self, tag: Priority, max_selections: usize) -> bool {
        if let Some(pos) = self.priorities.iter().position(|p| *p == tag) {
            self.priorities.remove(pos);
            return true;
        }

        if self.priorities.len() < max_selections {
            self.priorities.push(tag);
            return true;
        }

        tracing::trace!("Ignoring priority {} beyond cap of {}", tag.as_str(), max_selections);
        false
    }

    pub fn has_priority(&self, tag: Priority) -> bool {
        self.priorities.contains(&tag)
    }

    /// Whether every single-select step has been answered
    pub fn is_complete(&self) -> bool {
        self.ages.is_some() && self.skill.is_some() && self.budget.is_some()
    }

    /// Restore the set invariants on answers from an untrusted caller
    ///
    /// Duplicate tags are dropped (first occurrence wins) and the list is cut
    /// to `max_selections`.
    pub fn normalized(&self, max_selections: usize) -> Self {
        let mut priorities = Vec::with_capacity(self.priorities.len().min(max_selections));
        for tag in &self.priorities {
            if priorities.len() >= max_selections {
                break;
            }
            if !priorities.contains(tag) {
                priorities.push(*tag);
            }
        }

        Self {
            ages: self.ages,
            skill: self.skill,
            budget: self.budget,
            priorities,
        }
    }
}

/// Identifier of a quiz step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionId {
    Ages,
    Skill,
    Budget,
    Priorities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub title: String,
    pub subtitle: String,
    pub multi_select: bool,
    pub max_selections: usize,
    pub options: Vec<QuestionOption>,
}

fn option(value: &str, label: &str, emoji: &str) -> QuestionOption {
    QuestionOption {
        value: value.to_string(),
        label: label.to_string(),
        emoji: emoji.to_string(),
    }
}

/// Ordered question catalog for the multi-step form
///
/// Option values are the wire values of the answer enums, so whatever the
/// form posts back deserializes straight into [`QuizAnswers`].
pub fn quiz_questions(max_selections: usize) -> Vec<QuizQuestion> {
    let ages = AgeBracket::ALL
        .iter()
        .map(|a| {
            let (label, emoji) = match a {
                AgeBracket::Toddler => ("Toddlers (0-3)", "👶"),
                AgeBracket::Young => ("Little ones (4-7)", "🧒"),
                AgeBracket::Kids => ("Kids (8-12)", "⛷️"),
                AgeBracket::Teens => ("Teens (13+)", "🏂"),
            };
            option(a.as_str(), label, emoji)
        })
        .collect();

    let skills = SkillLevel::ALL
        .iter()
        .map(|s| {
            let (label, emoji) = match s {
                SkillLevel::FirstTimer => ("Never skied before", "🌱"),
                SkillLevel::Beginner => ("Beginner", "🟢"),
                SkillLevel::Intermediate => ("Intermediate", "🔵"),
                SkillLevel::Advanced => ("Advanced", "⚫"),
                SkillLevel::Mixed => ("A mix of everything", "🎨"),
            };
            option(s.as_str(), label, emoji)
        })
        .collect();

    let budgets = PriceLevel::ALL
        .iter()
        .map(|b| {
            let label = match b {
                PriceLevel::Budget => "Budget-friendly",
                PriceLevel::Moderate => "Mid-range",
                PriceLevel::Premium => "Comfortable",
                PriceLevel::Luxury => "Luxury",
            };
            option(b.as_str(), label, "💰")
        })
        .collect();

    let priorities = Priority::ALL
        .iter()
        .map(|p| {
            let (label, emoji) = match p {
                Priority::Childcare => ("Childcare & ski school", "🧸"),
                Priority::TerrainPark => ("Terrain park", "🛹"),
                Priority::Nightlife => ("Après-ski", "🍻"),
                Priority::Value => ("Great value", "🏷️"),
                Priority::Convenience => ("Ski-in/ski-out", "🚪"),
                Priority::SnowReliability => ("Reliable snow", "❄️"),
                Priority::NonSkiActivities => ("Things to do off the slopes", "🛷"),
                Priority::EnglishFriendly => ("English spoken", "🗣️"),
                Priority::VillageCharm => ("Village charm", "🏘️"),
            };
            option(p.as_str(), label, emoji)
        })
        .collect();

    vec![
        QuizQuestion {
            id: QuestionId::Ages,
            title: "How old are your kids?".to_string(),
            subtitle: "Pick the age group that fits most of your crew".to_string(),
            multi_select: false,
            max_selections: 1,
            options: ages,
        },
        QuizQuestion {
            id: QuestionId::Skill,
            title: "How does your family ski?".to_string(),
            subtitle: "Think of the least confident skier".to_string(),
            multi_select: false,
            max_selections: 1,
            options: skills,
        },
        QuizQuestion {
            id: QuestionId::Budget,
            title: "What's your lodging budget?".to_string(),
            subtitle: "Per night for the whole family".to_string(),
            multi_select: false,
            max_selections: 1,
            options: budgets,
        },
        QuizQuestion {
            id: QuestionId::Priorities,
            title: "What matters most?".to_string(),
            subtitle: format!("Choose up to {}", max_selections),
            multi_select: true,
            max_selections,
            options: priorities,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_answers_are_empty() {
        let answers = get_initial_answers();
        assert_eq!(answers.ages, None);
        assert_eq!(answers.skill, None);
        assert_eq!(answers.budget, None);
        assert!(answers.priorities.is_empty());
        assert!(!answers.is_complete());
    }

    #[test]
    fn test_single_select_newest_wins() {
        let mut answers = get_initial_answers();
        answers.apply(AnswerUpdate::Skill(SkillLevel::Beginner), 3);
        answers.apply(AnswerUpdate::Skill(SkillLevel::Advanced), 3);
        assert_eq!(answers.skill, Some(SkillLevel::Advanced));
    }

    #[test]
    fn test_toggle_removes_existing_tag() {
        let mut answers = get_initial_answers();
        assert!(answers.toggle_priority(Priority::Value, 3));
        assert!(answers.toggle_priority(Priority::Value, 3));
        assert!(answers.priorities.is_empty());
    }

    #[test]
    fn test_toggle_ignores_adds_past_cap() {
        let mut answers = get_initial_answers();
        answers.apply(AnswerUpdate::TogglePriority(Priority::Childcare), 3);
        answers.apply(AnswerUpdate::TogglePriority(Priority::Value), 3);
        answers.apply(AnswerUpdate::TogglePriority(Priority::Nightlife), 3);
        let before = answers.clone();

        assert!(!answers.toggle_priority(Priority::Convenience, 3));
        assert_eq!(answers, before);

        // Removing still works at the cap
        assert!(answers.toggle_priority(Priority::Value, 3));
        assert_eq!(answers.priorities, vec![Priority::Childcare, Priority::Nightlife]);
    }

    #[test]
    fn test_normalized_dedupes_and_caps() {
        let answers = QuizAnswers {
            priorities: vec![
                Priority::Value,
                Priority::Value,
                Priority::Childcare,
                Priority::Nightlife,
                Priority::Convenience,
            ],
            ..QuizAnswers::initial()
        };

        let normalized = answers.normalized(3);
        assert_eq!(
            normalized.priorities,
            vec![Priority::Value, Priority::Childcare, Priority::Nightlife]
        );
    }

    #[test]
    fn test_answer_update_wire_format() {
        let update: AnswerUpdate =
            serde_json::from_str(r#"{"field":"toggle-priority","value":"village-charm"}"#).unwrap();
        assert_eq!(update, AnswerUpdate::TogglePriority(Priority::VillageCharm));

        let update: AnswerUpdate = serde_json::from_str(r#"{"field":"budget","value":"$$"}"#).unwrap();
        assert_eq!(update, AnswerUpdate::Budget(PriceLevel::Moderate));
    }

    #[test]
    fn test_question_catalog_covers_vocabulary() {
        let questions = quiz_questions(3);
        assert_eq!(questions.len(), 4);
        assert_eq!(questions[0].options.len(), AgeBracket::ALL.len());
        assert_eq!(questions[3].options.len(), Priority::ALL.len());
        assert!(questions[3].multi_select);
        assert_eq!(questions[3].max_selections, 3);

        // Every option value must round-trip into the answer enums
        for opt in &questions[3].options {
            let parsed: Priority = serde_json::from_value(serde_json::json!(opt.value)).unwrap();
            assert_eq!(parsed.as_str(), opt.value);
        }
    }
}
