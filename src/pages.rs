//! Server-rendered Pages
//!
//! One HTML document per request: sidebar navigation, an optional notice and
//! the body of the session's current page.

use crate::hedgehog::{
    html_escape, AnalysisGate, Category, ExportFormat, HedgehogSession, Notice, NoticeLevel,
    Page, LOCKED_GATE_MESSAGE,
};

const STYLESHEET: &str = r#"
    body { font-family: "Source Sans Pro", Arial, sans-serif; margin: 0; display: flex; color: #1f2937; }
    .sidebar { width: 240px; min-height: 100vh; background-color: #f0f2f6; padding: 20px; box-sizing: border-box; }
    .sidebar form { margin: 0 0 8px 0; }
    .sidebar button { width: 100%; text-align: left; }
    .sidebar button.active { border-color: #1E3A8A; font-weight: bold; }
    main { flex: 1; padding: 30px 50px; max-width: 1100px; }
    button { padding: 8px 14px; border-radius: 6px; border: 1px solid #cbd5e1; background: #fff; cursor: pointer; }
    button:disabled { opacity: 0.6; cursor: wait; }
    textarea { width: 100%; height: 150px; box-sizing: border-box; font-family: inherit; }
    .header-text { font-size: 40px; font-weight: bold; color: #1E3A8A; text-align: center; margin-bottom: 20px; }
    .section-header { font-size: 24px; font-weight: bold; color: #1E3A8A; margin-top: 20px; margin-bottom: 10px; }
    .card { background-color: #f0f2f6; border-radius: 10px; padding: 20px; margin-bottom: 20px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }
    .notice { padding: 12px 16px; border-radius: 6px; margin-bottom: 20px; }
    .notice-success { background-color: #dcfce7; color: #166534; }
    .notice-warning { background-color: #fef9c3; color: #854d0e; }
    .columns { display: flex; gap: 30px; }
    .columns > div { flex: 1; }
    .footer { text-align: center; color: #6B7280; margin-top: 30px; padding: 10px; }
"#;

/// Render the full document for the session's current page
pub fn render_page(session: &HedgehogSession, notice: Option<&Notice>) -> String {
    let page = session.page();
    let body = match page {
        Page::Home => home_body(),
        Page::Profile => profile_body(session),
        Page::Analysis => analysis_body(session),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Hedgehog Strength Finder</title>
    <style>{}</style>
</head>
<body>
{}
<main>
{}
{}
<div class="footer">Hedgehog Strength Finder - Based on Jim Collins' Hedgehog Concept</div>
</main>
</body>
</html>
"#,
        STYLESHEET,
        sidebar(page),
        notice.map(render_notice).unwrap_or_default(),
        body
    )
}

fn sidebar(current: Page) -> String {
    let buttons: String = Page::ALL
        .iter()
        .map(|page| {
            let class = if *page == current { r#" class="active""# } else { "" };
            nav_button(*page, page.label(), class)
        })
        .collect();

    format!(
        r#"<nav class="sidebar">
<div class="section-header">Navigation</div>
{}
<form method="post" action="/session/reset"><button type="submit">↺ Start over</button></form>
</nav>"#,
        buttons
    )
}

fn nav_button(target: Page, label: &str, class: &str) -> String {
    format!(
        r#"<form method="post" action="/navigate"><input type="hidden" name="page" value="{}"><button type="submit"{}>{}</button></form>"#,
        target.slug(),
        class,
        label
    )
}

fn next_button(from: Page) -> String {
    match from.next() {
        Some(Page::Profile) => nav_button(Page::Profile, "Next: Your Profile", ""),
        Some(Page::Analysis) => nav_button(Page::Analysis, "Next: Analysis", ""),
        _ => String::new(),
    }
}

fn render_notice(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Success => "notice-success",
        NoticeLevel::Warning => "notice-warning",
    };
    format!(
        r#"<div class="notice {}">{}</div>"#,
        class,
        html_escape(&notice.message)
    )
}

fn home_body() -> String {
    format!(
        r#"<div class="header-text">Hedgehog Strength Finder</div>
<div class="card">
<p>Welcome to the Hedgehog Strength Finder! Based on Jim Collins' Hedgehog Concept, this tool helps you
identify your sweet spot at the intersection of:</p>
<ol>
    <li><strong>Passion:</strong> What you're deeply passionate about</li>
    <li><strong>Strength:</strong> What you can be the best in the world at</li>
    <li><strong>Market Need:</strong> What drives your economic engine (or what the world needs)</li>
</ol>
<p>At the intersection of these three circles lies your "Hedgehog Concept" - your optimal career path or life focus.</p>
</div>
<div class="card">
<h3>How to use this tool:</h3>
<ol>
    <li>Navigate to "Your Profile" and fill out the three sections</li>
    <li>Go to "Analysis" to review your three circles</li>
    <li>Get personalized insights from Gemini AI on how to improve and develop your strengths</li>
</ol>
</div>
<br>
{}"#,
        next_button(Page::Home)
    )
}

/// Prompt text for each profile section
fn section_copy(category: Category) -> (&'static str, &'static str, &'static str) {
    match category {
        Category::Passion => (
            "1. What are you deeply passionate about?",
            "List activities you love so much you could do them all night without being forced. \
             These are things you're naturally drawn to and want to improve at.",
            "Enter what you're passionate about (one item per line):",
        ),
        Category::Strength => (
            "2. What are you naturally good at?",
            "List skills and abilities you excel at naturally - these could be from talent, experience, \
             education, or your background. What do others recognize you as being good at?",
            "Enter what you're naturally good at (one item per line):",
        ),
        Category::MarketNeed => (
            "3. What does the world need that you can provide?",
            "List services or products you can provide that people would pay for or value. \
             What skills or knowledge do you have that solves real-world problems?",
            "Enter what the world needs that you can provide (one item per line):",
        ),
    }
}

fn save_label(category: Category) -> &'static str {
    match category {
        Category::Passion => "Save Passions",
        Category::Strength => "Save Strengths",
        Category::MarketNeed => "Save Market Needs",
    }
}

fn profile_body(session: &HedgehogSession) -> String {
    let sections: String = Category::ALL
        .iter()
        .map(|category| {
            let (title, help, label) = section_copy(*category);
            let slug = category.slug();
            format!(
                r#"<div class="section-header">{}</div>
<div class="card"><p>{}</p></div>
<form method="post" action="/profile/{}">
<label for="{}">{}</label>
<textarea id="{}" name="entries">{}</textarea>
<button type="submit">{}</button>
</form>
"#,
                title,
                help,
                slug,
                slug,
                label,
                slug,
                html_escape(&session.entries(*category).join("\n")),
                save_label(*category)
            )
        })
        .collect();

    format!(
        r#"<div class="header-text">Your Hedgehog Profile</div>
{}
<br>
{}"#,
        sections,
        next_button(Page::Profile)
    )
}

fn numbered_list(entries: &[String]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("<p>{}. {}</p>", i + 1, html_escape(entry)))
        .collect()
}

fn analysis_body(session: &HedgehogSession) -> String {
    let header = r#"<div class="header-text">Your Hedgehog Analysis</div>"#;

    if session.analysis_gate() == AnalysisGate::Locked {
        return format!(
            r#"{}
<div class="notice notice-warning">{}</div>"#,
            header, LOCKED_GATE_MESSAGE
        );
    }

    let columns: String = Category::ALL
        .iter()
        .map(|category| {
            format!(
                r#"<div><div class="section-header">{}</div>{}</div>"#,
                category.heading(),
                numbered_list(session.entries(*category))
            )
        })
        .collect();

    let cached = match session.analysis() {
        Some(outcome) => format!(
            r#"<div class="card">
{}
</div>
<p><a href="/export/{}" download="{}">📄 Download as TXT</a> &nbsp; <a href="/export/{}" download="{}">📊 Download as HTML Report</a></p>"#,
            outcome.to_markup(),
            ExportFormat::Text.slug(),
            ExportFormat::Text.file_name(),
            ExportFormat::Html.slug(),
            ExportFormat::Html.file_name()
        ),
        None => String::new(),
    };

    format!(
        r#"{}
<div class="columns">{}</div>
<div class="section-header">Gemini AI Analysis</div>
<form method="post" action="/analysis" onsubmit="var b=this.querySelector('button');b.disabled=true;b.textContent='Analyzing your profile with Gemini AI...';">
<button type="submit">Get Gemini Analysis</button>
</form>
{}"#,
        header, columns, cached
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hedgehog::AnalysisOutcome;

    fn complete_session() -> HedgehogSession {
        let mut session = HedgehogSession::new();
        session.replace_entries(Category::Passion, "writing\nhiking");
        session.replace_entries(Category::Strength, "public speaking");
        session.replace_entries(Category::MarketNeed, "coaching");
        session
    }

    #[test]
    fn test_home_has_sidebar_and_next_button() {
        let session = HedgehogSession::new();
        let html = render_page(&session, None);
        assert!(html.contains("Welcome to the Hedgehog Strength Finder"));
        assert!(html.contains(r#"value="profile""#));
        assert!(html.contains("Next: Your Profile"));
        assert!(html.contains(r#"<button type="submit" class="active">🏠 Home</button>"#));
    }

    #[test]
    fn test_profile_prefills_saved_entries() {
        let session = complete_session();
        let html = render_page(&session, None);
        assert!(html.contains("Your Hedgehog Profile"));
        assert!(html.contains(r#"action="/profile/market-need""#));
        assert!(html.contains("<textarea id=\"passion\" name=\"entries\">writing\nhiking</textarea>"));
        assert!(html.contains("Next: Analysis"));
    }

    #[test]
    fn test_analysis_locked_until_profile_complete() {
        let mut session = HedgehogSession::new();
        session.replace_entries(Category::Passion, "writing");
        session.navigate(Page::Analysis);

        let html = render_page(&session, None);
        assert!(html.contains(LOCKED_GATE_MESSAGE));
        assert!(!html.contains("Get Gemini Analysis"));
    }

    #[test]
    fn test_analysis_page_shows_lists_and_cached_result() {
        let mut session = complete_session();
        session.navigate(Page::Analysis);
        session.store_analysis(AnalysisOutcome::ready("<h3>Your sweet spot</h3>"));

        let html = render_page(&session, None);
        assert!(html.contains("<p>1. writing</p><p>2. hiking</p>"));
        assert!(html.contains("Get Gemini Analysis"));
        assert!(html.contains("<h3>Your sweet spot</h3>"));
        assert!(html.contains(r#"href="/export/html""#));
    }

    #[test]
    fn test_analysis_card_renders_markdown() {
        let mut session = complete_session();
        session.navigate(Page::Analysis);
        session.store_analysis(AnalysisOutcome::ready(
            "## Your Hedgehog\n\n- **Coach** writers\n- Teach hiking",
        ));

        let html = render_page(&session, None);
        assert!(html.contains("<h2>Your Hedgehog</h2>"));
        assert!(html.contains("<li>Teach hiking</li>"));
        assert!(!html.contains("## Your Hedgehog"));
    }

    #[test]
    fn test_no_downloads_without_analysis() {
        let mut session = complete_session();
        session.navigate(Page::Analysis);
        let html = render_page(&session, None);
        assert!(!html.contains("/export/txt"));
    }

    #[test]
    fn test_notice_is_escaped() {
        let session = HedgehogSession::new();
        let html = render_page(&session, Some(&Notice::warning("<b>careful</b>")));
        assert!(html.contains(r#"<div class="notice notice-warning">&lt;b&gt;careful&lt;/b&gt;</div>"#));
    }
}
