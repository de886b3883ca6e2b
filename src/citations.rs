use crate::data_models::{Citation, SearchResult};

/// Projects search results into citations, keeping provider order so that
/// `[n]` in the answer refers to `citations[n - 1]`.
pub fn assemble_citations(results: &[SearchResult]) -> Vec<Citation> {
    results
        .iter()
        .map(|result| Citation {
            title: result.title.clone(),
            link: result.link.clone(),
            snippet: result.snippet.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(n: usize) -> SearchResult {
        SearchResult {
            title: format!("Title {n}"),
            link: format!("https://example.com/{n}"),
            snippet: format!("Snippet {n}"),
            position: n,
        }
    }

    #[test]
    fn test_empty() {
        assert!(assemble_citations(&[]).is_empty());
    }

    #[test]
    fn test_preserves_order_and_fields() {
        // positions deliberately out of order: ordering follows the slice, not `position`
        let results = vec![result(3), result(1), result(2)];
        let citations = assemble_citations(&results);

        assert_eq!(citations.len(), results.len());
        for (citation, result) in citations.iter().zip(&results) {
            assert_eq!(citation.title, result.title);
            assert_eq!(citation.link, result.link);
            assert_eq!(citation.snippet, result.snippet);
        }
    }

    #[test]
    fn test_serialized_shape_has_no_position() {
        let json = serde_json::to_value(assemble_citations(&[result(1)])).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "title": "Title 1",
                "link": "https://example.com/1",
                "snippet": "Snippet 1"
            }])
        );
    }
}
