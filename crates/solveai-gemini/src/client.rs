//! [`GeminiClient`], the Gemini implementation of [`Solver`].

use std::{sync::Arc, time::Duration};

use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use solveai_core::{
  analysis::{AnalysisPayload, GeneratedConcept},
  input::ProblemInput,
  report::ChatMessage,
  research::{CompetitorAnalysis, CompetitorAnalysisResult, GeneratedImage, MarketNiche},
  solver::{Solver, SolverError},
};

use crate::{
  Error, Result,
  chat::GeminiChat,
  prompts,
  wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Tool,
    error_message, strip_code_fences,
  },
};

// ─── Configuration ────────────────────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
  pub api_key:      String,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_text_model")]
  pub text_model:   String,
  #[serde(default = "default_image_model")]
  pub image_model:  String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_text_model() -> String { DEFAULT_TEXT_MODEL.to_owned() }
fn default_image_model() -> String { DEFAULT_IMAGE_MODEL.to_owned() }
fn default_timeout_secs() -> u64 { 120 }

impl GeminiConfig {
  /// Default endpoints and models for `api_key`.
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:      api_key.into(),
      base_url:     default_base_url(),
      text_model:   default_text_model(),
      image_model:  default_image_model(),
      timeout_secs: default_timeout_secs(),
    }
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async client for the Gemini `generateContent` endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  http:   Client,
  config: Arc<GeminiConfig>,
}

impl GeminiClient {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { http, config: Arc::new(config) })
  }

  pub fn config(&self) -> &GeminiConfig { &self.config }

  fn url(&self, model: &str) -> String {
    format!(
      "{}/models/{model}:generateContent",
      self.config.base_url.trim_end_matches('/')
    )
  }

  /// POST one `generateContent` request and decode the envelope.
  pub(crate) async fn generate(
    &self,
    model: &str,
    request: &GenerateContentRequest,
  ) -> Result<GenerateContentResponse> {
    tracing::debug!(model, turns = request.contents.len(), "gemini request");

    let resp = self
      .http
      .post(self.url(model))
      .header("x-goog-api-key", &self.config.api_key)
      .json(request)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), message: error_message(&body) });
    }

    Ok(resp.json().await?)
  }

  /// Text model call constrained to `schema`, decoded into `T`.
  async fn generate_json<T: DeserializeOwned>(
    &self,
    prompt: String,
    schema: Value,
    temperature: f32,
  ) -> Result<T> {
    let mut request = GenerateContentRequest::prompt(prompt);
    request.generation_config = Some(GenerationConfig::json(schema, temperature));

    let text = self
      .generate(&self.config.text_model, &request)
      .await?
      .text()
      .ok_or(Error::EmptyResponse)?;
    Ok(serde_json::from_str(text.trim())?)
  }

  async fn try_solve(&self, input: &ProblemInput) -> Result<AnalysisPayload> {
    let request = GenerateContentRequest {
      contents:           vec![Content::user(prompts::solve_prompt(input))],
      system_instruction: Some(Content::system(prompts::SOLVER_INSTRUCTION)),
      generation_config:  Some(GenerationConfig::json(
        prompts::analysis_schema(),
        prompts::SOLVE_TEMPERATURE,
      )),
      tools:              Vec::new(),
    };

    let text = self
      .generate(&self.config.text_model, &request)
      .await?
      .text()
      .ok_or(Error::EmptyResponse)?;
    Ok(AnalysisPayload::from_model_output(&text)?)
  }

  async fn try_analyze_competitors(
    &self,
    concept: &GeneratedConcept,
  ) -> Result<CompetitorAnalysisResult> {
    let mut request = GenerateContentRequest::prompt(prompts::competitor_prompt(concept));
    request.generation_config = Some(GenerationConfig {
      temperature: Some(prompts::RESEARCH_TEMPERATURE),
      ..GenerationConfig::default()
    });
    request.tools.push(Tool::default());

    let resp = self.generate(&self.config.text_model, &request).await?;
    let raw = resp.text().unwrap_or_else(|| "{}".to_owned());

    let data = serde_json::from_str::<CompetitorAnalysis>(&strip_code_fences(&raw))
      .unwrap_or_else(|e| {
        tracing::warn!(concept = %concept.id, error = %e, "unparseable competitor analysis");
        CompetitorAnalysis::failed()
      });

    Ok(CompetitorAnalysisResult { data, sources: resp.sources() })
  }
}

// ─── Solver impl ──────────────────────────────────────────────────────────────

impl Solver for GeminiClient {
  type Chat = GeminiChat;

  async fn solve(&self, input: &ProblemInput) -> Result<AnalysisPayload, SolverError> {
    self.try_solve(input).await.map_err(|e| {
      tracing::warn!(error = %e, "analysis request failed");
      SolverError::from(e)
    })
  }

  async fn suggest_problems(&self, domain: &str) -> Vec<String> {
    self
      .generate_json(
        prompts::suggestion_prompt(domain),
        prompts::suggestion_schema(),
        prompts::IDEATION_TEMPERATURE,
      )
      .await
      .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "problem suggestions failed");
        Vec::new()
      })
  }

  async fn discover_niches(&self, domain: &str) -> Vec<MarketNiche> {
    self
      .generate_json(
        prompts::niche_prompt(domain),
        prompts::niche_schema(),
        prompts::IDEATION_TEMPERATURE,
      )
      .await
      .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "niche discovery failed");
        Vec::new()
      })
  }

  async fn generate_image(&self, prompt: &str) -> Option<GeneratedImage> {
    let request = GenerateContentRequest::prompt(prompt);
    match self.generate(&self.config.image_model, &request).await {
      Ok(resp) => resp.first_image(),
      Err(e) => {
        tracing::warn!(error = %e, "image generation failed");
        None
      }
    }
  }

  fn open_refinement_chat(
    &self,
    concept: &GeneratedConcept,
    history: &[ChatMessage],
  ) -> GeminiChat {
    GeminiChat::new(self.clone(), concept, history)
  }

  async fn analyze_competitors(
    &self,
    concept: &GeneratedConcept,
  ) -> Result<CompetitorAnalysisResult, SolverError> {
    self.try_analyze_competitors(concept).await.map_err(|e| {
      tracing::warn!(concept = %concept.id, error = %e, "competitor analysis failed");
      SolverError::from(e)
    })
  }
}
