//! Report Export
//!
//! Renders the cached analysis as a plain text download or as a standalone
//! HTML report with the three profile lists.

use super::types::Category;
use chrono::Local;
use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Date format used in the HTML report
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Hedgehog Analysis - {{DATE}}</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; line-height: 1.6; }
        h1 { color: #1E3A8A; }
        h2 { color: #2563EB; margin-top: 30px; }
        .container { max-width: 800px; margin: 0 auto; }
        .header { text-align: center; margin-bottom: 40px; }
        .footer { text-align: center; margin-top: 50px; font-size: 0.8em; color: #6B7280; }
        .analysis { background-color: #f8fafc; padding: 20px; border-radius: 5px; }
        .section { margin-bottom: 30px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Hedgehog Concept Analysis</h1>
            <p>Generated on {{DATE}}</p>
        </div>
{{SECTIONS}}
        <div class="section">
            <h2>AI Analysis</h2>
            <div class="analysis">
                {{ANALYSIS}}
            </div>
        </div>

        <div class="footer">
            <p>Based on Jim Collins' Hedgehog Concept from "Good to Great"</p>
        </div>
    </div>
</body>
</html>
"#;

/// Downloadable export formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Text,
    Html,
}

impl ExportFormat {
    pub fn from_slug(s: &str) -> Option<Self> {
        match s {
            "txt" | "text" => Some(ExportFormat::Text),
            "html" => Some(ExportFormat::Html),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Html => "html",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Text => "hedgehog_analysis.txt",
            ExportFormat::Html => "hedgehog_analysis.html",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Html => "text/html",
        }
    }
}

/// Inputs for one HTML report
pub struct ReportInput<'a> {
    pub passions: &'a [String],
    pub strengths: &'a [String],
    pub market_needs: &'a [String],
    /// Analysis markup, embedded as-is
    pub analysis: &'a str,
    pub date: String,
}

impl<'a> ReportInput<'a> {
    fn entries(&self, category: Category) -> &'a [String] {
        match category {
            Category::Passion => self.passions,
            Category::Strength => self.strengths,
            Category::MarketNeed => self.market_needs,
        }
    }
}

/// Today's date in the report format
pub fn report_date() -> String {
    Local::now().format(REPORT_DATE_FORMAT).to_string()
}

/// The plain text export is the analysis text itself
pub fn render_text(analysis: &str) -> String {
    analysis.to_string()
}

pub fn render_html(input: &ReportInput<'_>) -> String {
    let sections = Category::ALL
        .iter()
        .map(|category| render_section(category.heading(), input.entries(*category)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut substitutions = HashMap::new();
    substitutions.insert("{{DATE}}".to_string(), html_escape(&input.date));
    substitutions.insert("{{SECTIONS}}".to_string(), sections);
    substitutions.insert("{{ANALYSIS}}".to_string(), input.analysis.to_string());

    substitute(REPORT_TEMPLATE, &substitutions)
}

/// Render one profile list as a report section
fn render_section(heading: &str, entries: &[String]) -> String {
    format!(
        r#"
        <div class="section">
            <h2>{}</h2>
            <ul>
                {}
            </ul>
        </div>
"#,
        heading,
        render_list_items(entries)
    )
}

pub fn render_list_items(entries: &[String]) -> String {
    entries
        .iter()
        .map(|entry| format!("<li>{}</li>", html_escape(entry)))
        .collect::<Vec<String>>()
        .join("")
}

/// Single pass over the template so substituted values are never rescanned
fn substitute(template: &str, substitutions: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find("}}") {
            Some(end) => {
                let placeholder = &tail[..end + 2];
                match substitutions.get(placeholder) {
                    Some(value) => result.push_str(value),
                    None => result.push_str(placeholder),
                }
                rest = &tail[end + 2..];
            }
            None => {
                result.push_str(tail);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Render model Markdown (headings, lists, emphasis, tables) as HTML.
/// Inline HTML in the source is passed through.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, parser);
    rendered
}

/// Escape HTML special characters
pub fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
