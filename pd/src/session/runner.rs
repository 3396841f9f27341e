//! Streaming session runner
//!
//! Drives one generative-model invocation and converts its incremental
//! output into a lazy, finite sequence of [`StreamEvent`]s. Every failure
//! class collapses into a single terminal `Failure` event: by the time most
//! streaming errors are discovered the transport has already committed to a
//! streaming response, so the error has to travel in-band.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::llm::{CompletionRequest, LlmClient};

/// Channel depth for in-flight events
const EVENT_BUFFER: usize = 64;

/// One event of a streaming exchange
///
/// The sequence for any exchange contains zero or more `Fragment`s followed
/// by exactly one terminal event (`Done` or `Failure`); nothing follows the
/// terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One incremental unit of generated text
    Fragment(String),
    /// Normal completion
    Done,
    /// The exchange failed; the message is the collaborator's diagnostic,
    /// surfaced verbatim
    Failure(String),
}

/// Runs streaming exchanges against a generative-model client
///
/// The client handle is read-only configuration; one runner serves any
/// number of concurrent exchanges, each on its own task.
pub struct SessionRunner {
    client: Arc<dyn LlmClient>,
}

impl SessionRunner {
    /// Create a runner over the given client
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        debug!("SessionRunner::new: called");
        Self { client }
    }

    /// Run one exchange, returning the event sequence as a channel
    ///
    /// Spawns a task that forwards each non-empty model delta as a
    /// `Fragment` and finishes with exactly one terminal event. Dropping
    /// the receiver cancels the exchange: the task stops forwarding, aborts
    /// the model call, and emits nothing further.
    pub fn run(&self, request: CompletionRequest) -> mpsc::Receiver<StreamEvent> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let client = self.client.clone();
        let request_id = Uuid::now_v7();

        tokio::spawn(async move {
            debug!(%request_id, "session: streaming started");
            let (delta_tx, mut delta_rx) = mpsc::channel::<String>(EVENT_BUFFER);
            let call = tokio::spawn(async move { client.stream(request, delta_tx).await });

            while let Some(delta) = delta_rx.recv().await {
                if delta.is_empty() {
                    // An empty delta carries no information
                    debug!(%request_id, "session: suppressing empty fragment");
                    continue;
                }
                if event_tx.send(StreamEvent::Fragment(delta)).await.is_err() {
                    debug!(%request_id, "session: receiver dropped, cancelling");
                    call.abort();
                    return;
                }
            }

            // Delta channel closed: the model call has finished one way or
            // the other, and its result decides the terminal event.
            let terminal = match call.await {
                Ok(Ok(())) => {
                    debug!(%request_id, "session: completed");
                    StreamEvent::Done
                }
                Ok(Err(e)) => {
                    debug!(%request_id, error = %e, "session: failed");
                    StreamEvent::Failure(e.to_string())
                }
                Err(e) => {
                    debug!(%request_id, error = %e, "session: model task died");
                    StreamEvent::Failure(e.to_string())
                }
            };
            let _ = event_tx.send(terminal).await;
        });

        event_rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::ScriptedClient;
    use crate::prompts::{Composer, InteractionMode, PromptLoader, ReferenceDoc, Turn};
    use std::time::Duration;

    async fn collect(mut events: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut collected = Vec::new();
        while let Some(event) = events.recv().await {
            collected.push(event);
        }
        collected
    }

    #[tokio::test]
    async fn test_empty_fragments_suppressed_and_single_done() {
        let client = Arc::new(ScriptedClient::completing(&["A", "", "B"]));
        let runner = SessionRunner::new(client);

        let events = collect(runner.run(CompletionRequest::new("test", 100))).await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Fragment("A".to_string()),
                StreamEvent::Fragment("B".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_mid_stream_failure_is_terminal() {
        let client = Arc::new(ScriptedClient::failing(&["A"], "quota exhausted"));
        let runner = SessionRunner::new(client);

        let events = collect(runner.run(CompletionRequest::new("test", 100))).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::Fragment("A".to_string()));
        match &events[1] {
            StreamEvent::Failure(message) => assert!(message.contains("quota exhausted")),
            other => panic!("expected Failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_before_first_fragment() {
        let client = Arc::new(ScriptedClient::failing(&[], "bad credentials"));
        let runner = SessionRunner::new(client);

        let events = collect(runner.run(CompletionRequest::new("test", 100))).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamEvent::Failure(m) if m.contains("bad credentials")));
    }

    #[tokio::test]
    async fn test_dropping_receiver_cancels_the_exchange() {
        let deltas: Vec<String> = (0..512).map(|i| format!("d{}", i)).collect();
        let delta_refs: Vec<&str> = deltas.iter().map(|d| d.as_str()).collect();
        let client = Arc::new(ScriptedClient::completing(&delta_refs));
        let runner = SessionRunner::new(client.clone());

        let mut events = runner.run(CompletionRequest::new("test", 100));
        assert!(events.recv().await.is_some());
        drop(events);

        // Give the session task time to notice and abort the call
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(client.deltas_sent() < 512, "client kept streaming after cancellation");
    }

    #[tokio::test]
    async fn test_start_exchange_end_to_end() {
        let composer = Composer::new(PromptLoader::embedded_only(), 5000);
        let instruction = composer
            .compose(InteractionMode::Start, "problem", &[], &[])
            .expect("compose should succeed");

        let client = Arc::new(ScriptedClient::completing(&["좋은 ", "질문입니다"]));
        let runner = SessionRunner::new(client);

        let events = collect(runner.run(CompletionRequest::new(instruction, 100))).await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Fragment("좋은 ".to_string()),
                StreamEvent::Fragment("질문입니다".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_draft_exchange_terminates() {
        let composer = Composer::new(PromptLoader::embedded_only(), 5000);
        let history = vec![Turn::user("대표자는 개발자입니다")];
        let references = vec![ReferenceDoc {
            name: "notes.txt".to_string(),
            content: "메모".to_string(),
        }];
        let instruction = composer
            .compose(InteractionMode::GenerateDraft, "team", &history, &references)
            .expect("compose should succeed");

        let client = Arc::new(ScriptedClient::completing(&["## 팀 구성 초안"]));
        let runner = SessionRunner::new(client);

        let events = collect(runner.run(CompletionRequest::new(instruction, 100))).await;

        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }
}
