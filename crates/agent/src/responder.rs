//! Streaming answer delivery.
//!
//! [`StreamingResponder::respond`] records the question, sends the
//! instruction document plus the full history to the provider, and hands
//! back a [`ResponseStream`] of text fragments. The stream holds the history
//! borrow until it reaches a terminal state, at which point it appends
//! exactly one assistant message:
//!
//! - end of stream: the concatenated fragments
//! - provider error: fragments so far plus an error notice
//! - cancel or drop: fragments so far plus an interruption marker

use crate::turn::{TurnOutcome, TurnState};
use futures::{Stream, StreamExt};
use mastermind_core::history::ConversationHistory;
use mastermind_core::message::{Message, Role};
use mastermind_core::provider::{ChunkReceiver, Provider, ProviderRequest};
use mastermind_core::error::ProviderError;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tracing::{debug, info, warn};

/// Appended to an answer the consumer stopped reading.
pub const INTERRUPTED_MARKER: &str = "[Answer interrupted]";

/// Sends one question per call to the completion provider.
pub struct StreamingResponder {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl StreamingResponder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per answer.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Append `question` to `history` and start streaming the answer.
    ///
    /// The user message is committed before the provider is contacted, so
    /// it stays in the history even if the request fails. A failed request
    /// yields a stream that emits a single error notice and ends. Dropping
    /// the returned future while the request is pending commits the turn
    /// as cancelled.
    pub async fn respond<'h>(
        &self,
        history: &'h mut ConversationHistory,
        question: &str,
        instruction: String,
    ) -> ResponseStream<'h> {
        history.append(Role::User, question);

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(instruction));
        messages.extend(history.to_messages());

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: true,
        };

        info!(
            provider = self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            "Requesting answer"
        );

        let mut stream = ResponseStream::requesting(history);
        match self.provider.stream(request).await {
            Ok(receiver) => stream.attach(receiver),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Answer request failed");
                stream.fail(&e);
            }
        }
        stream
    }
}

/// Text fragments of one answer, in arrival order.
///
/// Empty fragments are never yielded. After the terminal state is reached,
/// polling yields `None` indefinitely.
pub struct ResponseStream<'h> {
    history: &'h mut ConversationHistory,
    receiver: Option<ChunkReceiver>,
    state: TurnState,
    buffer: String,
    fragments: usize,
    /// Error notice still owed to the consumer
    pending: Option<String>,
    outcome: Option<TurnOutcome>,
}

impl<'h> ResponseStream<'h> {
    fn requesting(history: &'h mut ConversationHistory) -> Self {
        Self {
            history,
            receiver: None,
            state: TurnState::Requesting,
            buffer: String::new(),
            fragments: 0,
            pending: None,
            outcome: None,
        }
    }

    fn attach(&mut self, receiver: ChunkReceiver) {
        self.receiver = Some(receiver);
        self.state = TurnState::Streaming;
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// The answer accumulated so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Set once the answer has been committed.
    pub fn outcome(&self) -> Option<&TurnOutcome> {
        self.outcome.as_ref()
    }

    /// Stop reading and commit what has arrived so far.
    ///
    /// No-op on an already finished stream beyond returning its outcome.
    pub fn cancel(mut self) -> TurnOutcome {
        self.settle()
    }

    /// Drive the stream to its end, handing every fragment to `sink`.
    pub async fn forward_to(&mut self, mut sink: impl FnMut(&str)) -> TurnOutcome {
        while let Some(fragment) = self.next().await {
            sink(&fragment);
        }
        self.settle()
    }

    /// Commit as cancelled unless already terminal.
    fn settle(&mut self) -> TurnOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let content = if self.buffer.is_empty() {
            INTERRUPTED_MARKER.to_string()
        } else {
            format!("{}\n\n{}", self.buffer, INTERRUPTED_MARKER)
        };
        self.commit(content, |sequence, fragments| TurnOutcome::Cancelled {
            sequence,
            fragments,
        })
    }

    fn fail(&mut self, error: &ProviderError) {
        if self.outcome.is_some() {
            return;
        }
        let notice = format!("[Error] The answer could not be completed: {error}");
        let (content, shown) = if self.buffer.is_empty() {
            (notice.clone(), notice)
        } else {
            (format!("{}\n\n{}", self.buffer, notice), format!("\n\n{notice}"))
        };
        let error = error.to_string();
        self.commit(content, |sequence, fragments| TurnOutcome::Failed {
            sequence,
            fragments,
            error,
        });
        self.pending = Some(shown);
    }

    fn commit(
        &mut self,
        content: String,
        outcome: impl FnOnce(u64, usize) -> TurnOutcome,
    ) -> TurnOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        // Closing the receiver stops the provider's reader task
        self.receiver = None;

        let sequence = self.history.append(Role::Assistant, content);
        let outcome = outcome(sequence, self.fragments);
        self.state = outcome.state();
        debug!(
            sequence,
            status = outcome.status(),
            fragments = self.fragments,
            "Committed answer"
        );
        self.outcome = Some(outcome.clone());
        outcome
    }
}

impl Stream for ResponseStream<'_> {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        let this = self.get_mut();

        if let Some(notice) = this.pending.take() {
            return Poll::Ready(Some(notice));
        }

        loop {
            if this.state.is_terminal() {
                return Poll::Ready(None);
            }
            let Some(receiver) = this.receiver.as_mut() else {
                this.fail(&ProviderError::StreamInterrupted("no active stream".into()));
                return Poll::Ready(this.pending.take());
            };

            match ready!(receiver.poll_recv(cx)) {
                Some(Ok(chunk)) => {
                    let text = chunk.content.filter(|c| !c.is_empty());
                    if let Some(text) = &text {
                        this.buffer.push_str(text);
                        this.fragments += 1;
                    }
                    if chunk.done {
                        let content = this.buffer.clone();
                        this.commit(content, |sequence, fragments| TurnOutcome::Completed {
                            sequence,
                            fragments,
                        });
                    }
                    if text.is_some() {
                        return Poll::Ready(text);
                    }
                    // Metadata-only chunk
                }
                Some(Err(e)) => {
                    warn!(error = %e, received = this.buffer.len(), "Answer stream failed");
                    this.fail(&e);
                    return Poll::Ready(this.pending.take());
                }
                None => {
                    warn!(received = this.buffer.len(), "Answer stream closed without end signal");
                    this.fail(&ProviderError::StreamInterrupted(
                        "provider closed the stream before the end signal".into(),
                    ));
                    return Poll::Ready(this.pending.take());
                }
            }
        }
    }
}

impl Drop for ResponseStream<'_> {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            let outcome = self.settle();
            debug!(sequence = outcome.sequence(), "Answer stream dropped before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Script, ScriptedProvider};
    use mastermind_core::provider::StreamChunk;

    fn responder(provider: Arc<ScriptedProvider>) -> StreamingResponder {
        StreamingResponder::new(provider, "test-model").with_max_tokens(512)
    }

    #[tokio::test]
    async fn completed_stream_commits_concatenation() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::answer(&[
            "Ward ", "counters ", "the spell.",
        ])]));
        let responder = responder(provider.clone());
        let mut history = ConversationHistory::new();

        let mut seen = Vec::new();
        let outcome = responder
            .respond(&mut history, "What does ward do?", "instruction".into())
            .await
            .forward_to(|f| seen.push(f.to_string()))
            .await;

        assert_eq!(seen, vec!["Ward ", "counters ", "the spell."]);
        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                sequence: 2,
                fragments: 3
            }
        );
        assert_eq!(history.len(), 2);
        assert_eq!(history.all()[0].role, Role::User);
        assert_eq!(history.all()[1].content, "Ward counters the spell.");
        assert_eq!(history.all()[1].content, seen.concat());
    }

    #[tokio::test]
    async fn request_carries_instruction_then_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Script::answer(&["a1"]),
            Script::answer(&["a2"]),
        ]));
        let responder = responder(provider.clone());
        let mut history = ConversationHistory::new();

        responder.respond(&mut history, "q1", "doc one".into()).await.forward_to(|_| {}).await;
        responder.respond(&mut history, "q2", "doc two".into()).await.forward_to(|_| {}).await;

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        assert!(second.stream);
        assert_eq!(second.max_tokens, Some(512));
        assert_eq!(
            second.messages,
            vec![
                Message::system("doc two"),
                Message::user("q1"),
                Message::assistant("a1"),
                Message::user("q2"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_and_metadata_chunks_are_skipped() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::Chunks(vec![
            Ok(StreamChunk::text("")),
            Ok(StreamChunk::default()),
            Ok(StreamChunk::text("Yes.")),
            Ok(StreamChunk::end()),
        ])]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        let mut stream = responder.respond(&mut history, "q", "doc".into()).await;
        assert_eq!(stream.next().await.as_deref(), Some("Yes."));
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.state(), TurnState::Committed);
        drop(stream);

        assert_eq!(history.last().unwrap().content, "Yes.");
    }

    #[tokio::test]
    async fn mid_stream_error_commits_partial_answer_with_notice() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::Chunks(vec![
            Ok(StreamChunk::text("Humility applies in ")),
            Err(ProviderError::Network("connection reset".into())),
        ])]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        let mut seen = String::new();
        let outcome = responder
            .respond(&mut history, "Humility and Opalescence?", "doc".into())
            .await
            .forward_to(|f| seen.push_str(f))
            .await;

        assert!(matches!(outcome, TurnOutcome::Failed { fragments: 1, .. }));
        assert_eq!(history.count(Role::Assistant), 1);
        let answer = &history.last().unwrap().content;
        assert!(answer.starts_with("Humility applies in "));
        assert!(answer.contains("connection reset"));
        assert_eq!(answer, &seen);
    }

    #[tokio::test]
    async fn rejected_request_keeps_question_and_commits_notice() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::Reject(
            ProviderError::AuthenticationFailed("invalid key".into()),
        )]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        let mut stream = responder.respond(&mut history, "q", "doc".into()).await;
        assert_eq!(stream.state(), TurnState::Failed);
        let notice = stream.next().await.unwrap();
        assert!(notice.contains("invalid key"));
        assert_eq!(stream.next().await, None);
        drop(stream);

        assert_eq!(history.len(), 2);
        assert_eq!(history.all()[0].content, "q");
        assert!(history.all()[1].content.starts_with("[Error]"));
    }

    #[tokio::test]
    async fn channel_closed_without_end_is_a_failure() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::Chunks(vec![Ok(
            StreamChunk::text("Partial"),
        )])]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        let outcome = responder
            .respond(&mut history, "q", "doc".into())
            .await
            .forward_to(|_| {})
            .await;

        match outcome {
            TurnOutcome::Failed { error, .. } => assert!(error.contains("Stream interrupted")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(history.count(Role::Assistant), 1);
    }

    #[tokio::test]
    async fn cancel_commits_partial_answer_with_marker() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::answer(&[
            "The first part. ",
            "The second part.",
        ])]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        let mut stream = responder.respond(&mut history, "q", "doc".into()).await;
        assert_eq!(stream.next().await.as_deref(), Some("The first part. "));
        let outcome = stream.cancel();

        assert!(matches!(outcome, TurnOutcome::Cancelled { fragments: 1, .. }));
        assert_eq!(history.count(Role::Assistant), 1);
        assert_eq!(
            history.last().unwrap().content,
            format!("The first part. \n\n{INTERRUPTED_MARKER}")
        );
    }

    #[tokio::test]
    async fn dropping_the_stream_commits_once() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::answer(&["a", "b"])]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        {
            let mut stream = responder.respond(&mut history, "q", "doc".into()).await;
            stream.next().await;
        }

        assert_eq!(history.count(Role::Assistant), 1);
        assert!(history.last().unwrap().content.ends_with(INTERRUPTED_MARKER));
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_commits_interrupted_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Script::Hang,
            Script::answer(&["a2"]),
        ]));
        let responder = responder(provider.clone());
        let mut history = ConversationHistory::new();

        let pending = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            responder.respond(&mut history, "q1", "doc".into()),
        )
        .await;
        assert!(pending.is_err());
        drop(pending);

        let roles: Vec<Role> = history.all().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(history.last().unwrap().content, INTERRUPTED_MARKER);

        responder.respond(&mut history, "q2", "doc".into()).await.forward_to(|_| {}).await;
        let second = &provider.requests()[1];
        assert_eq!(
            second.messages,
            vec![
                Message::system("doc"),
                Message::user("q1"),
                Message::assistant(INTERRUPTED_MARKER),
                Message::user("q2"),
            ]
        );
    }

    #[tokio::test]
    async fn finished_stream_keeps_yielding_none() {
        let provider = Arc::new(ScriptedProvider::new(vec![Script::answer(&["done"])]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        let mut stream = responder.respond(&mut history, "q", "doc".into()).await;
        while stream.next().await.is_some() {}
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.next().await, None);
        let outcome = stream.cancel();
        assert!(outcome.is_completed());

        assert_eq!(history.count(Role::Assistant), 1);
    }

    #[tokio::test]
    async fn sequences_strictly_increase_across_turns() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Script::answer(&["a1"]),
            Script::Reject(ProviderError::Timeout("slow".into())),
            Script::answer(&["a3"]),
        ]));
        let responder = responder(provider);
        let mut history = ConversationHistory::new();

        for q in ["q1", "q2", "q3"] {
            responder.respond(&mut history, q, "doc".into()).await.forward_to(|_| {}).await;
        }

        let seqs: Vec<u64> = history.all().iter().map(|m| m.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(history.count(Role::User), 3);
        assert_eq!(history.count(Role::Assistant), 3);
    }
}
