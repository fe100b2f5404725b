use thiserror::Error;

use crate::jarvis::ChatMessage;

use super::{ClientError, JarvisRemote};

pub const READY_GREETING: &str =
    "I'm ready to help you analyze your process. What's on your mind?";
pub const CONNECTION_APOLOGY: &str =
    "I'm having trouble connecting to my brain right now. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("a reply is still pending")]
    Busy,

    #[error("message is empty")]
    EmptyInput,
}

/// Conversation held by the chat widget. One request may be in flight at a
/// time; a failed call still ends in an assistant message.
#[derive(Debug, Clone)]
pub struct JarvisChat {
    messages: Vec<ChatMessage>,
    state: ChatState,
}

impl JarvisChat {
    /// Open the conversation, surfacing dashboard prompts in the greeting when any exist.
    pub fn new(prompts: &[String]) -> Self {
        let greeting = if prompts.is_empty() {
            READY_GREETING.to_string()
        } else {
            let bullets: Vec<String> = prompts.iter().map(|p| format!("• {p}")).collect();
            format!(
                "Welcome to your trading room. Here are a few things I noticed:\n\n{}",
                bullets.join("\n")
            )
        };

        Self {
            messages: vec![ChatMessage::assistant(greeting)],
            state: ChatState::Idle,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Record the user's turn. Rejected while a reply is pending or when the input is blank.
    pub fn begin(&mut self, input: &str) -> Result<(), ChatError> {
        if self.state == ChatState::AwaitingResponse {
            return Err(ChatError::Busy);
        }
        let input = input.trim();
        if input.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        self.messages.push(ChatMessage::user(input));
        self.state = ChatState::AwaitingResponse;
        Ok(())
    }

    pub fn finish(&mut self, reply: Result<String, ClientError>) {
        let text = match reply {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Jarvis reply failed");
                CONNECTION_APOLOGY.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(text));
        self.state = ChatState::Idle;
    }

    /// Full turn against a remote: begin, send the history, finish.
    pub async fn send<R: JarvisRemote>(
        &mut self,
        remote: &R,
        input: &str,
        system_prompt: Option<&str>,
    ) -> Result<(), ChatError> {
        self.begin(input)?;
        let reply = remote.send_message(&self.messages, system_prompt).await;
        self.finish(reply);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jarvis::ChatRole;
    use std::future::Future;
    use std::sync::Mutex;

    struct ScriptedRemote {
        reply: Option<String>,
        seen: Mutex<Vec<usize>>,
    }

    impl JarvisRemote for ScriptedRemote {
        fn send_message(
            &self,
            history: &[ChatMessage],
            _system_prompt: Option<&str>,
        ) -> impl Future<Output = Result<String, ClientError>> + Send {
            self.seen.lock().unwrap().push(history.len());
            let reply = self.reply.clone();
            async move {
                reply.ok_or(ClientError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            }
        }
    }

    #[test]
    fn greeting_lists_prompts() {
        let chat = JarvisChat::new(&["Log today's session".into(), "Review NVDA".into()]);
        let greeting = &chat.messages()[0];
        assert_eq!(greeting.role, ChatRole::Assistant);
        assert_eq!(
            greeting.content,
            "Welcome to your trading room. Here are a few things I noticed:\n\n• Log today's session\n• Review NVDA"
        );

        let plain = JarvisChat::new(&[]);
        assert_eq!(plain.messages()[0].content, READY_GREETING);
    }

    #[test]
    fn second_message_while_pending_is_busy() {
        let mut chat = JarvisChat::new(&[]);
        chat.begin("How was my week?").unwrap();
        assert_eq!(chat.state(), ChatState::AwaitingResponse);
        assert_eq!(chat.begin("hello?"), Err(ChatError::Busy));
        assert_eq!(chat.messages().len(), 2);
    }

    #[test]
    fn blank_input_rejected() {
        let mut chat = JarvisChat::new(&[]);
        assert_eq!(chat.begin("   "), Err(ChatError::EmptyInput));
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn send_appends_reply_and_returns_to_idle() {
        let remote = ScriptedRemote {
            reply: Some("You cut winners early.".into()),
            seen: Mutex::new(Vec::new()),
        };
        let mut chat = JarvisChat::new(&[]);
        chat.send(&remote, "What am I doing wrong?", None).await.unwrap();

        assert_eq!(chat.state(), ChatState::Idle);
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.messages()[2].content, "You cut winners early.");
        // greeting + user turn went out
        assert_eq!(*remote.seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn failed_send_ends_with_apology() {
        let remote = ScriptedRemote {
            reply: None,
            seen: Mutex::new(Vec::new()),
        };
        let mut chat = JarvisChat::new(&[]);
        chat.send(&remote, "Anything?", None).await.unwrap();

        assert_eq!(chat.state(), ChatState::Idle);
        let last = chat.messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, CONNECTION_APOLOGY);
    }
}
