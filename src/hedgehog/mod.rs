//! Hedgehog Module - Core of the Strength Finder
//!
//! Architecture:
//! - Types: entry categories and notices
//! - Session: per-browser-session profile lists, page and cached analysis
//! - Navigation: closed page set with explicit transitions and the analysis gate
//! - Prompt + Analysis: Gemini request and tagged outcome
//! - Report: text and HTML exports

pub mod analysis;
pub mod navigation;
pub mod prompt;
pub mod report;
pub mod session;
pub mod types;

pub use analysis::*;
pub use navigation::*;
pub use prompt::*;
pub use report::*;
pub use session::*;
pub use types::*;
