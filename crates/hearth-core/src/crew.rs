//! Specialist crews — one fixed, ordered group of roles per category
//!
//! A specialist is plain data: role name, goal, and backstory. The texts
//! are consumed verbatim by the remote model as prompt framing; dispatch
//! logic only cares about ordering.

use crate::category::Category;

/// A named specialist role within a crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specialist {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub allow_delegation: bool,
}

const PERSONAL_SPECIALISTS: &[Specialist] = &[
    Specialist {
        role: "Finance Agent",
        goal: "Manage and analyze personal finances, budgets, and expenses",
        backstory: "You are a financial expert AI agent. You help users manage \
            their household budget, track expenses, and plan for financial goals.",
        allow_delegation: true,
    },
    Specialist {
        role: "Planner Agent",
        goal: "Optimize daily planning and project management",
        backstory: "You are a productivity specialist. You help users organize \
            tasks, manage projects, and optimize their daily schedules.",
        allow_delegation: true,
    },
    Specialist {
        role: "Calendar Agent",
        goal: "Manage schedules and optimize time management",
        backstory: "You are a calendar management expert. You optimize \
            schedules and manage time-based commitments.",
        allow_delegation: true,
    },
];

const KNOWLEDGE_SPECIALISTS: &[Specialist] = &[
    Specialist {
        role: "Idea Agent",
        goal: "Capture and develop household and personal ideas",
        backstory: "You are an innovative AI agent specialized in capturing \
            insights and organizing them into a growing knowledge base.",
        allow_delegation: true,
    },
    Specialist {
        role: "Reading Agent",
        goal: "Optimize reading and learning",
        backstory: "You help users process and retain information from their \
            reading materials effectively.",
        allow_delegation: true,
    },
    Specialist {
        role: "Tech Science Agent",
        goal: "Track technology and science trends",
        backstory: "You monitor and analyze developments in the tech and \
            science fields.",
        allow_delegation: true,
    },
    Specialist {
        role: "Geopolitics Agent",
        goal: "Monitor geopolitical developments",
        backstory: "You track and analyze global political and economic trends.",
        allow_delegation: true,
    },
];

const HOUSE_SPECIALISTS: &[Specialist] = &[
    Specialist {
        role: "Inventory Agent",
        goal: "Track household inventory and manage shopping lists",
        backstory: "You are a meticulous inventory manager. You track pantry \
            items, monitor expiration dates, and manage shopping lists.",
        allow_delegation: true,
    },
    Specialist {
        role: "Chore Coordinator Agent",
        goal: "Assign and track household chores fairly",
        backstory: "You are a household operations specialist. You assign \
            chores to family members, track completion, and manage a rewards \
            system.",
        allow_delegation: true,
    },
];

/// An ordered group of specialists handling one request category.
/// Immutable after construction.
#[derive(Debug, Clone, Copy)]
pub struct Crew {
    pub category: Category,
    specialists: &'static [Specialist],
}

impl Crew {
    pub fn specialists(&self) -> &'static [Specialist] {
        self.specialists
    }

    /// Selection policy: always the first-listed specialist.
    ///
    /// Simplification for now; kept as a named seam so real routing can
    /// replace it without touching the dispatcher contract.
    pub fn select_first(&self) -> &'static Specialist {
        &self.specialists[0]
    }
}

/// The three crews, built once at startup and never mutated.
#[derive(Debug, Clone, Copy)]
pub struct CrewRegistry {
    personal: Crew,
    knowledge: Crew,
    house: Crew,
}

impl CrewRegistry {
    pub fn new() -> Self {
        Self {
            personal: Crew {
                category: Category::Personal,
                specialists: PERSONAL_SPECIALISTS,
            },
            knowledge: Crew {
                category: Category::Knowledge,
                specialists: KNOWLEDGE_SPECIALISTS,
            },
            house: Crew {
                category: Category::House,
                specialists: HOUSE_SPECIALISTS,
            },
        }
    }

    pub fn crew_for(&self, category: Category) -> &Crew {
        match category {
            Category::Personal => &self.personal,
            Category::Knowledge => &self.knowledge,
            Category::House => &self.house,
        }
    }
}

impl Default for CrewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crew_lookup_matches_category() {
        let registry = CrewRegistry::new();
        for category in [Category::Personal, Category::Knowledge, Category::House] {
            assert_eq!(registry.crew_for(category).category, category);
        }
    }

    #[test]
    fn test_crew_ordering() {
        let registry = CrewRegistry::new();

        let personal: Vec<&str> = registry
            .crew_for(Category::Personal)
            .specialists()
            .iter()
            .map(|s| s.role)
            .collect();
        assert_eq!(personal, ["Finance Agent", "Planner Agent", "Calendar Agent"]);

        let knowledge: Vec<&str> = registry
            .crew_for(Category::Knowledge)
            .specialists()
            .iter()
            .map(|s| s.role)
            .collect();
        assert_eq!(
            knowledge,
            [
                "Idea Agent",
                "Reading Agent",
                "Tech Science Agent",
                "Geopolitics Agent"
            ]
        );

        let house: Vec<&str> = registry
            .crew_for(Category::House)
            .specialists()
            .iter()
            .map(|s| s.role)
            .collect();
        assert_eq!(house, ["Inventory Agent", "Chore Coordinator Agent"]);
    }

    #[test]
    fn test_select_first_is_list_head() {
        let registry = CrewRegistry::new();
        assert_eq!(
            registry.crew_for(Category::Personal).select_first().role,
            "Finance Agent"
        );
        assert_eq!(
            registry.crew_for(Category::Knowledge).select_first().role,
            "Idea Agent"
        );
        // structurally first is the inventory specialist, not the chore
        // coordinator the house label names
        assert_eq!(
            registry.crew_for(Category::House).select_first().role,
            "Inventory Agent"
        );
    }

    #[test]
    fn test_specialists_have_prompt_framing() {
        let registry = CrewRegistry::new();
        for category in [Category::Personal, Category::Knowledge, Category::House] {
            for specialist in registry.crew_for(category).specialists() {
                assert!(!specialist.goal.is_empty());
                assert!(!specialist.backstory.is_empty());
                assert!(specialist.allow_delegation);
            }
        }
    }
}
