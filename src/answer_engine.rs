use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::citations::assemble_citations;
use crate::data_models::{AIResponse, Query};
use crate::errors::AppError;
use crate::prompt::build_prompt;
use crate::search_provider::SearchProvider;
use crate::synthesizer::AnswerModel;

/// Sequences search, prompt building, synthesis and citation assembly for one query.
#[derive(Clone)]
pub struct AnswerEngine {
    search: Arc<dyn SearchProvider>,
    model: Arc<dyn AnswerModel>,
}

impl AnswerEngine {
    pub fn new(search: Arc<dyn SearchProvider>, model: Arc<dyn AnswerModel>) -> Self {
        Self { search, model }
    }

    pub async fn answer(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<AIResponse, AppError> {
        let start = Instant::now();

        let results = self.search.fetch_results(query, cancel).await?;
        log::info!(
            "search returned {} results in {}ms",
            results.len(),
            start.elapsed().as_millis()
        );

        let prompt = build_prompt(query, &results);
        log::debug!("prompt built, {} bytes", prompt.len());

        let synth_start = Instant::now();
        let answer = self.model.synthesize(&prompt, cancel).await?;
        log::info!(
            "answer synthesized in {}ms ({} chars)",
            synth_start.elapsed().as_millis(),
            answer.len()
        );

        Ok(AIResponse {
            answer,
            citations: assemble_citations(&results),
        })
    }
}
