//! Page Controller
//!
//! The three pages form a closed set. Navigation is always user-triggered and
//! sets the target page directly; every page can be revisited.

use serde::{Deserialize, Serialize};

/// Pages of the tool
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    Profile,
    Analysis,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::Profile, Page::Analysis];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Profile => "profile",
            Page::Analysis => "analysis",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        match s {
            "home" => Some(Page::Home),
            "profile" => Some(Page::Profile),
            "analysis" => Some(Page::Analysis),
            _ => None,
        }
    }

    /// Sidebar label
    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "🏠 Home",
            Page::Profile => "👤 Your Profile",
            Page::Analysis => "📊 Analysis",
        }
    }

    /// The page reached by the in-page "Next" button, if any
    pub fn next(&self) -> Option<Page> {
        match self {
            Page::Home => Some(Page::Profile),
            Page::Profile => Some(Page::Analysis),
            Page::Analysis => None,
        }
    }
}

/// Transition function. Targets are explicit, so this never rejects.
pub fn transition(_current: Page, target: Page) -> Page {
    target
}

/// Whether the analysis UI may be shown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisGate {
    Open,
    /// At least one profile list is still empty
    Locked,
}

pub const LOCKED_GATE_MESSAGE: &str = "Please fill out all three sections in Your Profile first.";

impl AnalysisGate {
    pub fn evaluate(passions: &[String], strengths: &[String], market_needs: &[String]) -> Self {
        if passions.is_empty() || strengths.is_empty() || market_needs.is_empty() {
            AnalysisGate::Locked
        } else {
            AnalysisGate::Open
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, AnalysisGate::Open)
    }
}
