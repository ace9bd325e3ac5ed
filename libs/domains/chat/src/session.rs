use domain_completion::{CompletionMode, Message, Role};
use futures::StreamExt;

use crate::client::{Answer, QueryingClient};
use crate::error::{ChatError, ChatResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    ProducingResponse,
}

/// One conversation: its transcript and whether an answer is in flight.
///
/// The transcript starts with the assistant greeting and only grows. A turn
/// appends the user message when it begins and the assistant message when it
/// completes; a failed turn leaves no assistant entry.
#[derive(Debug, Clone)]
pub struct ChatSession {
    transcript: Vec<Message>,
    state: SessionState,
}

impl ChatSession {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            transcript: vec![Message::assistant(greeting)],
            state: SessionState::AwaitingInput,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.transcript.last()
    }

    /// Start a turn with `prompt`.
    pub fn begin_turn(&mut self, prompt: &str) -> ChatResult<()> {
        if self.state == SessionState::ProducingResponse {
            return Err(ChatError::Busy);
        }
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        self.transcript.push(Message::user(prompt));
        self.state = SessionState::ProducingResponse;
        Ok(())
    }

    /// Record the assistant's answer and wait for the next prompt.
    pub fn finish_turn(&mut self, response: impl Into<String>) -> ChatResult<&Message> {
        if self.state != SessionState::ProducingResponse {
            return Err(ChatError::NoPendingTurn);
        }

        self.transcript.push(Message::assistant(response));
        self.state = SessionState::AwaitingInput;
        Ok(&self.transcript[self.transcript.len() - 1])
    }

    /// Drop the in-flight turn; the user message stays in the transcript.
    pub fn abort_turn(&mut self) {
        self.state = SessionState::AwaitingInput;
    }

    /// Run one whole turn against the backend.
    ///
    /// `on_text` sees every fragment as it arrives (the full text once in
    /// batched mode). Returns the complete answer.
    pub async fn ask<F>(
        &mut self,
        client: &QueryingClient,
        prompt: &str,
        mode: CompletionMode,
        mut on_text: F,
    ) -> ChatResult<String>
    where
        F: FnMut(&str),
    {
        self.begin_turn(prompt)?;

        match produce(client, prompt, mode, &mut on_text).await {
            Ok(response) => {
                self.finish_turn(response.clone())?;
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Chat turn failed");
                self.abort_turn();
                Err(err)
            }
        }
    }

    /// Messages sent by `role`, oldest first.
    pub fn messages_by(&self, role: Role) -> impl Iterator<Item = &Message> {
        self.transcript.iter().filter(move |m| m.role == role)
    }
}

async fn produce<F: FnMut(&str)>(
    client: &QueryingClient,
    prompt: &str,
    mode: CompletionMode,
    on_text: &mut F,
) -> ChatResult<String> {
    match client.send_question(prompt, mode).await? {
        Answer::Full(text) => {
            on_text(&text);
            Ok(text)
        }
        Answer::Streamed(mut stream) => {
            let mut text = String::new();
            while let Some(fragment) = stream.next().await {
                let fragment = fragment?;
                on_text(&fragment);
                text.push_str(&fragment);
            }
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_with_greeting() {
        let session = ChatSession::new("Hello! How can I help you today?");

        assert_eq!(session.state(), SessionState::AwaitingInput);
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Assistant);
        assert_eq!(session.transcript()[0].content, "Hello! How can I help you today?");
    }

    #[test]
    fn test_turn_appends_user_then_assistant() {
        let mut session = ChatSession::new("hi");

        session.begin_turn("What is the refund policy?").unwrap();
        assert_eq!(session.state(), SessionState::ProducingResponse);
        assert_eq!(session.last_message().unwrap().role, Role::User);

        let answer = session.finish_turn("Within 30 days.").unwrap();
        assert_eq!(answer.content, "Within 30 days.");
        assert_eq!(session.state(), SessionState::AwaitingInput);

        let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let mut session = ChatSession::new("hi");
        session.begin_turn("first").unwrap();

        assert!(matches!(session.begin_turn("second"), Err(ChatError::Busy)));
        assert_eq!(session.messages_by(Role::User).count(), 1);
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        let mut session = ChatSession::new("hi");

        assert!(matches!(session.begin_turn("   "), Err(ChatError::EmptyPrompt)));
        assert_eq!(session.state(), SessionState::AwaitingInput);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_finish_without_turn_is_rejected() {
        let mut session = ChatSession::new("hi");
        assert!(matches!(session.finish_turn("x"), Err(ChatError::NoPendingTurn)));
    }

    #[test]
    fn test_aborted_turn_leaves_no_assistant_entry() {
        let mut session = ChatSession::new("hi");
        session.begin_turn("question").unwrap();
        session.abort_turn();

        assert_eq!(session.state(), SessionState::AwaitingInput);
        assert_eq!(session.messages_by(Role::Assistant).count(), 1);
        assert_eq!(session.last_message().unwrap().content, "question");
    }
}
