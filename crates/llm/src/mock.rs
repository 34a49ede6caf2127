//! Scripted `LlmProvider` for tests — the agent loop and orchestrator test
//! suites drive it instead of a real HTTP call.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::provider::LlmProvider;
use crate::types::{CompleteRequest, CompleteResponse, StreamEvent};

/// Replays `responses[0]`, `responses[1]`, ... on successive `complete()`
/// calls, repeating the last entry once exhausted.
pub struct MockProvider {
    model: String,
    responses: Vec<CompleteResponse>,
    call_count: AtomicUsize,
}

impl MockProvider {
    #[must_use]
    pub fn new(model: impl Into<String>, responses: Vec<CompleteResponse>) -> Self {
        Self {
            model: model.into(),
            responses,
            call_count: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls_made(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, _request: CompleteRequest) -> Result<CompleteResponse> {
        let i = self.call_count.fetch_add(1, Ordering::SeqCst);
        let idx = i.min(self.responses.len().saturating_sub(1));
        Ok(self.responses[idx].clone())
    }

    async fn stream(&self, request: CompleteRequest) -> Result<mpsc::Receiver<StreamEvent>> {
        let response = self.complete(request).await?;
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            for block in response.content {
                if let crate::types::ContentBlock::Text { text } = block {
                    let _ = tx.send(StreamEvent::TextDelta(text)).await;
                }
            }
            let _ = tx.send(StreamEvent::Usage(response.usage)).await;
            let _ = tx.send(StreamEvent::Stop).await;
        });
        Ok(rx)
    }
}
