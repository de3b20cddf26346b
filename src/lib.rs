//! Hedgehog Strength Finder
//!
//! A single-user web tool for Jim Collins' Hedgehog Concept exercise:
//! - Profile lists for passions, strengths and market needs
//! - Per-session state with explicit page navigation
//! - Gemini-backed narrative analysis
//! - Plain text and HTML report export

pub mod api;
pub mod config;
pub mod hedgehog;
pub mod pages;

pub use hedgehog::*;
