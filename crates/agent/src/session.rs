//! One user's conversation with the judge.

use crate::context::ContextAssembler;
use crate::responder::{ResponseStream, StreamingResponder};
use crate::selection::CardSelection;
use crate::turn::TurnOutcome;
use mastermind_core::card::Card;
use mastermind_core::history::ConversationHistory;
use mastermind_core::message::{ConversationId, ConversationMessage};
use std::sync::Arc;
use tracing::info;

/// Owns the history and card selection of one conversation.
///
/// Grounding sources and the provider are shared between sessions; the
/// history is not. `&mut self` on [`ask`](Self::ask) guarantees one turn
/// at a time.
pub struct JudgeSession {
    id: ConversationId,
    assembler: Arc<ContextAssembler>,
    responder: Arc<StreamingResponder>,
    history: ConversationHistory,
    selection: CardSelection,
}

impl JudgeSession {
    pub fn new(assembler: Arc<ContextAssembler>, responder: Arc<StreamingResponder>) -> Self {
        Self {
            id: ConversationId::new(),
            assembler,
            responder,
            history: ConversationHistory::new(),
            selection: CardSelection::new(),
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Ground `question` against the current selection and start streaming.
    pub async fn ask(&mut self, question: &str) -> ResponseStream<'_> {
        info!(
            conversation_id = %self.id,
            cards = self.selection.len(),
            "Handling question"
        );
        let bundle = self.assembler.assemble(question, self.selection.cards()).await;
        let instruction = self.assembler.render(&bundle);
        self.responder
            .respond(&mut self.history, question, instruction)
            .await
    }

    /// Answer `question`, passing each fragment to `on_fragment` as it arrives.
    pub async fn handle_question(
        &mut self,
        question: &str,
        on_fragment: impl FnMut(&str),
    ) -> TurnOutcome {
        let outcome = self.ask(question).await.forward_to(on_fragment).await;
        info!(
            conversation_id = %self.id,
            status = outcome.status(),
            fragments = outcome.fragments(),
            "Question answered"
        );
        outcome
    }

    pub fn current_history(&self) -> &[ConversationMessage] {
        self.history.all()
    }

    pub fn selected_cards(&self) -> &[Card] {
        self.selection.cards()
    }

    pub fn selection(&self) -> &CardSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut CardSelection {
        &mut self.selection
    }
}
