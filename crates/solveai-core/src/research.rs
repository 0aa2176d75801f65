//! Auxiliary results from the solver service: market niches, competitor
//! research and generated images.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::analysis::Level;

// ─── Niches ──────────────────────────────────────────────────────────────────

/// An underserved market opportunity within a broader domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketNiche {
  pub name:              String,
  pub description:       String,
  pub competition_level: Level,
  pub potential_gap:     String,
}

// ─── Competitor research ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
  #[serde(default)]
  pub name:         String,
  #[serde(default)]
  pub product_name: String,
  #[serde(default)]
  pub key_overlap:  String,
  #[serde(default)]
  pub weakness:     String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
  #[serde(default)]
  pub competitors:                   Vec<Competitor>,
  #[serde(default)]
  pub differentiation_opportunities: Vec<String>,
  #[serde(default)]
  pub verdict:                       String,
}

impl CompetitorAnalysis {
  /// The shape recorded when the research response could not be parsed.
  pub fn failed() -> Self {
    Self {
      competitors:                   Vec::new(),
      differentiation_opportunities: vec!["Could not parse competitor data.".to_owned()],
      verdict:                       "Analysis failed.".to_owned(),
    }
  }
}

/// A web page the research step was grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSource {
  pub title: String,
  pub uri:   String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysisResult {
  pub data:    CompetitorAnalysis,
  #[serde(default)]
  pub sources: Vec<SearchSource>,
}

// ─── Images ──────────────────────────────────────────────────────────────────

/// An image returned inline by the image model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
  pub mime_type: String,
  /// Base64-encoded image bytes.
  pub data:      String,
}

impl GeneratedImage {
  /// Render as a `data:` URL suitable for an `<img src>`.
  pub fn to_data_url(&self) -> String {
    format!("data:{};base64,{}", self.mime_type, self.data)
  }

  /// Decode the base64 payload into raw bytes.
  pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> { B64.decode(&self.data) }

  /// File extension matching the MIME type, falling back to `bin`.
  pub fn extension(&self) -> &'static str {
    match self.mime_type.as_str() {
      "image/png" => "png",
      "image/jpeg" | "image/jpg" => "jpg",
      "image/webp" => "webp",
      "image/gif" => "gif",
      _ => "bin",
    }
  }
}
