//! Hedgehog Types
//!
//! Core data structures shared by the session, the pages and the API.

use serde::{Deserialize, Serialize};

// ============================================================
// ENTRY CATEGORIES
// ============================================================

/// One of the three Hedgehog Concept circles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// What you are deeply passionate about
    Passion,
    /// What you can be the best in the world at
    Strength,
    /// What drives your economic engine
    MarketNeed,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Passion, Category::Strength, Category::MarketNeed];

    /// URL path segment
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Passion => "passion",
            Category::Strength => "strength",
            Category::MarketNeed => "market-need",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        match s {
            "passion" | "passions" => Some(Category::Passion),
            "strength" | "strengths" => Some(Category::Strength),
            "market-need" | "market_need" | "market-needs" | "market_needs" => {
                Some(Category::MarketNeed)
            }
            _ => None,
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Category::Passion => "passion",
            Category::Strength => "strength",
            Category::MarketNeed => "market need",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Category::Passion => "passions",
            Category::Strength => "strengths",
            Category::MarketNeed => "market needs",
        }
    }

    /// Section heading used on the analysis page and in the HTML report
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Passion => "Your Passions",
            Category::Strength => "Your Strengths",
            Category::MarketNeed => "Market Needs",
        }
    }
}

// ============================================================
// NOTICES
// ============================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
}

/// One-shot feedback shown on the next page render
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Feedback after saving a category list
    pub fn for_save(category: Category, saved: Option<usize>) -> Self {
        match saved {
            Some(count) => Notice::success(format!("Saved {} {}!", count, category.plural())),
            None => Notice::warning(format!("Please enter at least one {}.", category.singular())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_slugs_resolve() {
        for category in Category::ALL {
            assert_eq!(Category::from_slug(category.slug()), Some(category));
        }
        assert_eq!(Category::from_slug("market_needs"), Some(Category::MarketNeed));
        assert_eq!(Category::from_slug("hobbies"), None);
    }

    #[test]
    fn test_save_notices() {
        let ok = Notice::for_save(Category::Passion, Some(2));
        assert_eq!(ok.level, NoticeLevel::Success);
        assert_eq!(ok.message, "Saved 2 passions!");

        let warn = Notice::for_save(Category::MarketNeed, None);
        assert_eq!(warn.level, NoticeLevel::Warning);
        assert_eq!(warn.message, "Please enter at least one market need.");
    }
}
