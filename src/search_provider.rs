use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SearchConfig;
use crate::data_models::{Query, SearchResult};
use crate::errors::ProviderError;

/// Keyword search backend producing results in provider rank order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn fetch_results(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, ProviderError>;
}

// Subset of the SerpApi Google engine payload we rely on.
#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    error: Option<String>,
    organic_results: Option<Vec<OrganicResult>>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

pub struct SerpApiClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl SerpApiClient {
    pub fn new(client: reqwest::Client, config: SearchConfig) -> SerpApiClient {
        SerpApiClient { client, config }
    }

    async fn request(&self, query: &Query) -> Result<Vec<SearchResult>, ProviderError> {
        let params = [
            ("engine", "google"),
            ("q", query.as_str()),
            ("hl", self.config.hl.as_str()),
            ("gl", self.config.gl.as_str()),
            ("api_key", self.config.api_key.as_str()),
        ];

        let response = self
            .client
            .get(&self.config.url)
            .query(&params)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        parse_response(status, &body)
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn fetch_results(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        log::debug!("fetching search results for {:?}", query.as_str());
        tokio::select! {
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            results = self.request(query) => results,
        }
    }
}

/// Decodes a SerpApi body. A reported `error` wins over the HTTP status.
fn parse_response(status: StatusCode, body: &str) -> Result<Vec<SearchResult>, ProviderError> {
    let decoded = serde_json::from_str::<SerpApiResponse>(body);

    let response = match decoded {
        Ok(SerpApiResponse {
            error: Some(message),
            ..
        }) => return Err(ProviderError::Reported(message)),
        _ if !status.is_success() => {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }
        Ok(response) => response,
        Err(e) => return Err(ProviderError::Malformed(e.to_string())),
    };

    response
        .organic_results
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, result)| {
            let position = i + 1;
            let title = result.title.ok_or_else(|| {
                ProviderError::Malformed(format!("organic result {position} has no title"))
            })?;
            let link = result.link.ok_or_else(|| {
                ProviderError::Malformed(format!("organic result {position} has no link"))
            })?;
            Ok(SearchResult {
                title,
                link,
                snippet: result.snippet.unwrap_or_default(),
                position,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_organic_results_with_positions() {
        let body = r#"{
            "search_metadata": {"status": "Success"},
            "organic_results": [
                {"position": 1, "title": "Rayleigh scattering", "link": "https://en.wikipedia.org/wiki/Rayleigh_scattering", "snippet": "Short wavelengths scatter more."},
                {"position": 2, "title": "NASA", "link": "https://spaceplace.nasa.gov/blue-sky/"}
            ]
        }"#;

        let results = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rayleigh scattering");
        assert_eq!(results[0].position, 1);
        assert_eq!(results[1].link, "https://spaceplace.nasa.gov/blue-sky/");
        assert_eq!(results[1].snippet, "");
        assert_eq!(results[1].position, 2);
    }

    #[test]
    fn test_no_organic_results_is_empty() {
        let results = parse_response(StatusCode::OK, r#"{"search_metadata": {}}"#).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_reported_error() {
        let err = parse_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Reported(ref m) if m.starts_with("Invalid API key")));
    }

    #[test]
    fn test_reported_error_with_ok_status() {
        let err = parse_response(
            StatusCode::OK,
            r#"{"error": "Google hasn't returned any results for this query."}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Reported(_)));
    }

    #[test]
    fn test_non_json_status_error() {
        let err = parse_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 502, .. }));
    }

    #[test]
    fn test_non_json_success_is_malformed() {
        let err = parse_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_missing_link_is_malformed() {
        let body = r#"{"organic_results": [{"title": "no link here"}]}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(ref m) if m.contains("no link")));
    }
}
