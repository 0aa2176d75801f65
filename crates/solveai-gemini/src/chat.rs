//! Refinement chats over the stateless `generateContent` endpoint.

use solveai_core::{
  analysis::GeneratedConcept,
  report::{ChatMessage, Role},
  solver::{CHAT_EMPTY_REPLY, CHAT_ERROR_REPLY, RefinementChat},
};

use crate::{
  client::GeminiClient,
  prompts,
  wire::{Content, GenerateContentRequest},
};

/// A conversation about one concept. Holds the full wire history and resends
/// it on every turn.
pub struct GeminiChat {
  client:      GeminiClient,
  instruction: Content,
  history:     Vec<Content>,
}

impl GeminiChat {
  pub(crate) fn new(
    client: GeminiClient,
    concept: &GeneratedConcept,
    recorded: &[ChatMessage],
  ) -> Self {
    let (context, ready) = prompts::chat_seed(concept);
    let mut turns = vec![(Role::User, context), (Role::Model, ready)];
    turns.extend(hydrate(recorded));

    Self {
      client,
      instruction: Content::system(prompts::chat_instruction(concept)),
      history: coalesce(turns),
    }
  }

  /// Number of turns that will be sent before the next user message.
  pub fn history_len(&self) -> usize { self.history.len() }
}

/// Recorded turns worth replaying: the local greeting and inline error
/// replies never reached the model, so they (and the user turn an error
/// answered) are left out.
fn hydrate(recorded: &[ChatMessage]) -> Vec<(Role, String)> {
  let mut turns: Vec<(Role, String)> = Vec::new();
  for (i, msg) in recorded.iter().enumerate() {
    if i == 0 && msg.role == Role::Model {
      continue;
    }
    let failed = msg.role == Role::Model
      && (msg.text == CHAT_ERROR_REPLY || msg.text == CHAT_EMPTY_REPLY);
    if failed {
      if matches!(turns.last(), Some((Role::User, _))) {
        turns.pop();
      }
      continue;
    }
    turns.push((msg.role, msg.text.clone()));
  }
  turns
}

/// Append a turn, folding it into the last one when the role repeats; the
/// API expects alternation.
fn push_turn(history: &mut Vec<Content>, role: Role, text: &str) {
  let role_name = match role {
    Role::User => "user",
    Role::Model => "model",
  };
  if let Some(last) = history.last_mut()
    && last.role == Some(role_name)
    && let Some(part) = last.parts.last_mut()
  {
    part.text.push_str("\n\n");
    part.text.push_str(text);
    return;
  }
  history.push(match role {
    Role::User => Content::user(text),
    Role::Model => Content::model(text),
  });
}

fn coalesce(turns: Vec<(Role, String)>) -> Vec<Content> {
  let mut merged = Vec::new();
  for (role, text) in turns {
    push_turn(&mut merged, role, &text);
  }
  merged
}

impl RefinementChat for GeminiChat {
  /// The history is only updated once a reply arrives, so a failed or
  /// dropped turn leaves it as it was.
  async fn send(&mut self, text: &str) -> String {
    let mut contents = self.history.clone();
    push_turn(&mut contents, Role::User, text);

    let request = GenerateContentRequest {
      contents,
      system_instruction: Some(self.instruction.clone()),
      generation_config: None,
      tools: Vec::new(),
    };

    let model = self.client.config().text_model.clone();
    let outcome = self.client.generate(&model, &request).await;
    match outcome {
      Ok(resp) => match resp.text() {
        Some(reply) => {
          self.history = request.contents;
          push_turn(&mut self.history, Role::Model, &reply);
          reply
        }
        None => CHAT_EMPTY_REPLY.to_owned(),
      },
      Err(e) => {
        tracing::warn!(error = %e, "chat turn failed");
        CHAT_ERROR_REPLY.to_owned()
      }
    }
  }
}
