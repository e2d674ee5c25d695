use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

/// Trait for vision/OCR clients to allow mocking and abstraction
pub trait VisionClient: Send + Sync {
    fn extract_text(&self, image: &[u8], prompt: &str) -> Result<String>;
}

/// Client for the Gemini `generateContent` endpoint. One blocking call
/// per request; no retries or timeouts beyond ureq's defaults.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    agent: ureq::Agent,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            agent: ureq::Agent::new(),
        }
    }
}

impl VisionClient for GeminiClient {
    fn extract_text(&self, image: &[u8], prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "image/png", "data": STANDARD.encode(image) } },
                    { "text": prompt },
                ]
            }]
        });

        let resp = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(body);

        match resp {
            Ok(r) => {
                let body: GenerateResponse = r.into_json()?;
                let text = body
                    .candidates
                    .first()
                    .map(|c| {
                        c.content
                            .parts
                            .iter()
                            .map(|p| p.text.as_str())
                            .collect::<Vec<_>>()
                            .join("")
                    })
                    .unwrap_or_default();
                debug!("Vision service returned {} characters", text.len());
                Ok(text.trim().to_string())
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(anyhow!("Vision API error {}: {}", code, body))
            }
            Err(e) => Err(anyhow!("Vision request failed: {}", e)),
        }
    }
}
