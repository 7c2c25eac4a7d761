use crate::formats::SearchSuggestions;

/// Query refinements, most useful first. `{q}` is replaced by the query.
const SUGGESTION_TEMPLATES: [&str; 10] = [
    "{q} site:wikipedia.org",
    "{q} site:stackoverflow.com",
    "{q} site:github.com",
    "{q} news",
    "{q} tutorial",
    "{q} review",
    "how to {q}",
    "what is {q}",
    "{q} vs",
    "best {q}",
];

pub const MAX_SUGGESTIONS: usize = 5;

/// Templated refinements for a search box. No network access.
pub fn search_suggestions(query: &str, timestamp: String) -> SearchSuggestions {
    let query = query.trim();
    let suggestions = SUGGESTION_TEMPLATES
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|template| template.replace("{q}", query))
        .collect();
    SearchSuggestions {
        query: query.to_owned(),
        suggestions,
        timestamp,
    }
}
