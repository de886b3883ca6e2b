use crate::data_models::{Query, SearchResult};

const RESULT_DELIMITER: &str = "---";

const INSTRUCTIONS: &str = "Please provide a well-structured answer that:
1. Synthesizes information from multiple sources
2. Cites specific sources using [1], [2], etc.
3. Maintains accuracy and relevance to the query
4. Provides a balanced perspective when applicable";

/// Builds the user prompt for the language model.
///
/// Results are emitted in slice order, so the n-th result is the source the
/// model should cite as `[n]`. Snippet text is embedded verbatim.
pub fn build_prompt(query: &Query, results: &[SearchResult]) -> String {
    let sources = results
        .iter()
        .map(|result| {
            format!(
                "Title: {}\nURL: {}\nSnippet: {}\n{}",
                result.title, result.link, result.snippet, RESULT_DELIMITER
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on the following search results, please provide a comprehensive answer to the query: \"{}\"\n\nSearch Results:\n{}\n\n{}",
        query, sources, INSTRUCTIONS
    )
}
