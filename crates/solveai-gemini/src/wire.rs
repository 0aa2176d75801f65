//! Request and response bodies for `models/{model}:generateContent`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use solveai_core::research::{GeneratedImage, SearchSource};

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
  pub contents:           Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub system_instruction: Option<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub generation_config:  Option<GenerationConfig>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub tools:              Vec<Tool>,
}

impl GenerateContentRequest {
  /// A single user turn with no extra configuration.
  pub fn prompt(text: impl Into<String>) -> Self {
    Self {
      contents:           vec![Content::user(text)],
      system_instruction: None,
      generation_config:  None,
      tools:              Vec::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Content {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role:  Option<&'static str>,
  pub parts: Vec<Part>,
}

impl Content {
  pub fn user(text: impl Into<String>) -> Self {
    Self { role: Some("user"), parts: vec![Part { text: text.into() }] }
  }

  pub fn model(text: impl Into<String>) -> Self {
    Self { role: Some("model"), parts: vec![Part { text: text.into() }] }
  }

  /// Role-less content, as used for system instructions.
  pub fn system(text: impl Into<String>) -> Self {
    Self { role: None, parts: vec![Part { text: text.into() }] }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Part {
  pub text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temperature:        Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub response_mime_type: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub response_schema:    Option<Value>,
}

impl GenerationConfig {
  /// Structured JSON output constrained by `schema`.
  pub fn json(schema: Value, temperature: f32) -> Self {
    Self {
      temperature:        Some(temperature),
      response_mime_type: Some("application/json"),
      response_schema:    Some(schema),
    }
  }
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct Tool {
  #[serde(rename = "google_search")]
  pub google_search: GoogleSearch,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct GoogleSearch {}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
  #[serde(default)]
  pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
  pub content:            Option<CandidateContent>,
  pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
  #[serde(default)]
  pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponsePart {
  pub text:        Option<String>,
  pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
  pub mime_type: Option<String>,
  #[serde(default)]
  pub data:      String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
  #[serde(default)]
  pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroundingChunk {
  pub web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebChunk {
  pub uri:   Option<String>,
  pub title: Option<String>,
}

impl GenerateContentResponse {
  fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
    self
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .into_iter()
      .flat_map(|content| content.parts.iter())
  }

  /// Concatenated text of the first candidate, if it has any.
  pub fn text(&self) -> Option<String> {
    let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
    (!text.trim().is_empty()).then_some(text)
  }

  /// The first non-empty inline-data part, as an image.
  pub fn first_image(&self) -> Option<GeneratedImage> {
    self.parts().find_map(|part| {
      let inline = part.inline_data.as_ref()?;
      (!inline.data.is_empty()).then(|| GeneratedImage {
        mime_type: inline
          .mime_type
          .clone()
          .unwrap_or_else(|| "image/png".to_owned()),
        data:      inline.data.clone(),
      })
    })
  }

  /// Web sources from the grounding metadata; chunks without a URI are
  /// skipped.
  pub fn sources(&self) -> Vec<SearchSource> {
    self
      .candidates
      .first()
      .and_then(|c| c.grounding_metadata.as_ref())
      .map(|meta| {
        meta
          .grounding_chunks
          .iter()
          .filter_map(|chunk| {
            let web = chunk.web.as_ref()?;
            let uri = web.uri.clone().filter(|u| !u.is_empty())?;
            Some(SearchSource {
              title: web.title.clone().unwrap_or_else(|| "Source".to_owned()),
              uri,
            })
          })
          .collect()
      })
      .unwrap_or_default()
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorWrapper {
  error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: Option<String>,
  status:  Option<String>,
}

/// Pull a readable message out of a Gemini error body, falling back to the
/// raw body.
pub(crate) fn error_message(body: &str) -> String {
  serde_json::from_str::<ErrorWrapper>(body)
    .map(|wrapper| {
      let msg = wrapper.error.message.unwrap_or_else(|| body.to_owned());
      match wrapper.error.status {
        Some(status) if !status.is_empty() => format!("{status}: {msg}"),
        _ => msg,
      }
    })
    .unwrap_or_else(|_| body.to_owned())
}

/// Remove Markdown code fences a model sometimes wraps JSON in.
pub(crate) fn strip_code_fences(text: &str) -> String {
  text.replace("```json", "").replace("```", "").trim().to_owned()
}
