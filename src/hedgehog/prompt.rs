//! Prompt for the Hedgehog analysis request.

/// Build the instructional prompt around bulleted blocks of the user's entries.
pub fn build_prompt(passions: &[String], strengths: &[String], market_needs: &[String]) -> String {
    format!(
        r#"You are an expert career coach and personal development advisor. I'm going to share information about
a person's passions, strengths, and identified market needs based on Jim Collins' Hedgehog Concept.

Please analyze this information and provide:
1. A summary of how these three areas might intersect to form their "Hedgehog Concept" - their optimal
   career path or life focus
2. Specific, actionable directions for improving and developing their strengths
3. Suggestions for how they might better align their passions and strengths with market needs
4. Potential career paths or business opportunities that leverage all three areas

Format your response with clear headings and bullet points where appropriate. Be specific, practical,
and encouraging.

## USER'S PASSIONS (Activities they love doing and could do all night):
{}

## USER'S STRENGTHS (What they're naturally good at):
{}

## MARKET NEEDS (What they can provide that the world needs):
{}
"#,
        bullet_block(passions),
        bullet_block(strengths),
        bullet_block(market_needs),
    )
}

/// Format entries as a `- item` block, one per line
pub fn bullet_block(entries: &[String]) -> String {
    entries
        .iter()
        .map(|entry| format!("- {}", entry))
        .collect::<Vec<_>>()
        .join("\n")
}
