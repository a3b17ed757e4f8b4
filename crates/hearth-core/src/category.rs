//! Request classification
//!
//! Maps free-text prompts to one of three fixed crew categories via
//! substring keyword matching. Keyword lists are checked in a fixed
//! priority order, so a prompt that mentions both "research" and "pantry"
//! lands in the knowledge crew. Simple keyword routing for local runs;
//! in production this would be an LLM-based classifier.

use serde::{Deserialize, Serialize};

/// The three fixed request categories. Classification is total: every
/// prompt maps to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Knowledge,
    House,
    Personal,
}

impl Category {
    /// Wire name, as it appears in the envelope's `results[].agent` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::House => "house",
            Self::Personal => "personal",
        }
    }

    /// Fixed display label used when logging a dispatch.
    ///
    /// Note: this is independent of which specialist the crew actually
    /// selects. For the house crew the label names the chore coordinator
    /// while selection picks the list-first inventory specialist.
    pub fn agent_label(&self) -> &'static str {
        match self {
            Self::Knowledge => "ReadingAgent",
            Self::House => "ChoreCoordinatorAgent",
            Self::Personal => "PlannerAgent",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const KNOWLEDGE_KEYWORDS: &[&str] = &[
    "learn",
    "what is",
    "how does",
    "explain",
    "geopolitics",
    "tech",
    "science",
    "idea",
    "research",
];

const HOUSE_KEYWORDS: &[&str] = &[
    "chore",
    "clean",
    "inventory",
    "milk",
    "eggs",
    "pantry",
    "stock",
    "shopping",
];

const PERSONAL_KEYWORDS: &[&str] = &[
    "finance",
    "budget",
    "plan",
    "calendar",
    "schedule",
    "meeting",
    "task",
    "todo",
];

/// Classify a prompt into a category.
///
/// Case-insensitive substring containment against each keyword list, in
/// priority order knowledge → house → personal. Matching is not
/// word-bounded, so "technology" hits "tech". Prompts that match nothing
/// (including the empty string) default to [`Category::Knowledge`].
pub fn classify(text: &str) -> Category {
    let lower = text.to_lowercase();

    if KNOWLEDGE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Category::Knowledge;
    }
    if HOUSE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Category::House;
    }
    if PERSONAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Category::Personal;
    }

    Category::Knowledge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_knowledge() {
        assert_eq!(classify("explain quantum computing"), Category::Knowledge);
        assert_eq!(classify("what is a sourdough starter?"), Category::Knowledge);
        assert_eq!(classify("latest geopolitics summary"), Category::Knowledge);
    }

    #[test]
    fn test_classify_house() {
        assert_eq!(classify("we're out of milk"), Category::House);
        assert_eq!(classify("add eggs to the shopping list"), Category::House);
        assert_eq!(classify("who does the dishes chore tonight?"), Category::House);
    }

    #[test]
    fn test_classify_personal() {
        assert_eq!(classify("review my budget for June"), Category::Personal);
        assert_eq!(classify("move the dentist meeting"), Category::Personal);
        assert_eq!(classify("add a todo for tomorrow"), Category::Personal);
    }

    #[test]
    fn test_classify_default_is_knowledge() {
        assert_eq!(classify(""), Category::Knowledge);
        assert_eq!(classify("hello there"), Category::Knowledge);
        assert_eq!(classify("42"), Category::Knowledge);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("CLEAN the pantry"), classify("clean the pantry"));
        assert_eq!(classify("BUDGET review"), Category::Personal);
    }

    #[test]
    fn test_classify_substring_not_word_bounded() {
        // "tech" embedded in "technology" still matches
        assert_eq!(classify("technology news"), Category::Knowledge);
        // "plan" embedded in "planning" still matches
        assert_eq!(classify("planning dinner"), Category::Personal);
    }

    #[test]
    fn test_knowledge_wins_priority_ties() {
        // contains both "research" (knowledge) and "pantry" (house)
        assert_eq!(classify("research pantry organization"), Category::Knowledge);
        // contains both "explain" (knowledge) and "budget" (personal)
        assert_eq!(classify("explain my budget"), Category::Knowledge);
    }

    #[test]
    fn test_house_wins_over_personal() {
        // contains both "clean" (house) and "schedule" (personal)
        assert_eq!(classify("clean up my schedule"), Category::House);
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(Category::Knowledge.as_str(), "knowledge");
        assert_eq!(Category::House.as_str(), "house");
        assert_eq!(Category::Personal.as_str(), "personal");
    }

    #[test]
    fn test_category_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Category::House).unwrap(), "\"house\"");
        let cat: Category = serde_json::from_str("\"personal\"").unwrap();
        assert_eq!(cat, Category::Personal);
    }

    #[test]
    fn test_agent_labels() {
        assert_eq!(Category::Knowledge.agent_label(), "ReadingAgent");
        assert_eq!(Category::House.agent_label(), "ChoreCoordinatorAgent");
        assert_eq!(Category::Personal.agent_label(), "PlannerAgent");
    }
}
