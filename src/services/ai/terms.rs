use serde::Deserialize;

use crate::models::Category;
use crate::services::ai::TextModel;

const TERM_PROMPT: &str = r#"You help a homeowner find the right local service business.
Read the problem description and answer with the single best Google Maps search term
for the kind of business that fixes it (for example "emergency plumber" or "hvac repair").

Return ONLY valid JSON (no markdown, no explanation): {"term": "search term"}

Problem description:
"#;

const MAX_TERM_CHARS: usize = 60;

#[derive(Deserialize)]
struct TermResponse {
    term: String,
}

/// Fixed Places query per category, used when no refinement is available.
pub fn default_term(category: Category) -> &'static str {
    match category {
        Category::Hvac => "hvac repair",
        Category::Plumber => "plumber",
        Category::Electrician => "electrician",
        Category::Roofer => "roofing contractor",
        Category::Appliance => "appliance repair",
        Category::Pest => "pest control",
        Category::General => "handyman",
    }
}

pub async fn recommend_term(model: &dyn TextModel, problem_text: &str) -> anyhow::Result<String> {
    let prompt = format!("{TERM_PROMPT}{}", problem_text.trim());
    let response = model.generate(&prompt).await?;
    parse_term_response(&response)
}

fn parse_term_response(response: &str) -> anyhow::Result<String> {
    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    let term = match serde_json::from_str::<TermResponse>(cleaned) {
        Ok(parsed) => parsed.term,
        // Models sometimes answer with the bare term.
        Err(_) if !cleaned.contains(['{', '}']) => cleaned.trim_matches('"').to_string(),
        Err(e) => anyhow::bail!("unparseable term response: {e}"),
    };

    let term = term.trim().to_lowercase();
    if term.is_empty() {
        anyhow::bail!("empty search term");
    }
    if term.chars().count() > MAX_TERM_CHARS {
        anyhow::bail!("search term too long");
    }
    Ok(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        assert_eq!(
            parse_term_response(r#"{"term": "Emergency Plumber"}"#).unwrap(),
            "emergency plumber"
        );
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "```json\n{\"term\": \"hvac repair\"}\n```";
        assert_eq!(parse_term_response(response).unwrap(), "hvac repair");
    }

    #[test]
    fn test_parse_bare_term() {
        assert_eq!(parse_term_response("\"roof repair\"\n").unwrap(), "roof repair");
    }

    #[test]
    fn test_rejects_broken_json_and_empty() {
        assert!(parse_term_response("{\"term\": ").is_err());
        assert!(parse_term_response(r#"{"term": "  "}"#).is_err());
        assert!(parse_term_response(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_default_terms() {
        assert_eq!(default_term(Category::Hvac), "hvac repair");
        assert_eq!(default_term(Category::General), "handyman");
    }
}
