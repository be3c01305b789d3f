//! Gemini API 클라이언트 - 모델 목록 조회 + 텍스트 생성
//!
//! source: https://ai.google.dev/api/generate-content
//!
//! 생성 호출은 단일 시도입니다. 실패는 재시도 없이 호출자에게
//! 그대로 전파되어 에러 계약(500)으로 매핑됩니다.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{get_api_key, GenerationProvider, ModelInfo};

/// Gemini API 베이스 URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 기본 생성 모델 (목록 조회 실패 시 폴백)
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// 업스트림 호출 타임아웃
///
/// 만료된 호출은 무한 대기 대신 에러로 표면화됩니다.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// GeminiClient
// ============================================================================

/// Gemini API 클라이언트
///
/// API 키는 URL이 아닌 `x-goog-api-key` 헤더로 전송합니다.
#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// 새 클라이언트 생성
    ///
    /// # Arguments
    /// * `api_key` - Google AI API 키
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }

    /// 환경변수에서 API 키를 읽어 생성
    pub fn from_env() -> Result<Self> {
        Self::new(get_api_key()?)
    }
}

// ============================================================================
// API Request/Response Types
// ============================================================================

/// generateContent 요청 본문
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

/// generateContent 응답
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// 모델 목록 응답
#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
    #[serde(rename = "supportedGenerationMethods", default)]
    supported_generation_methods: Vec<String>,
}

/// Gemini API 에러 응답
#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[serde(default)]
    status: String,
}

// ============================================================================
// GenerationProvider Implementation
// ============================================================================

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", GEMINI_API_BASE);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .context("Failed to send model list request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            return Err(gemini_error(status, &body));
        }

        let listing: ListModelsResponse =
            serde_json::from_str(&body).context("Failed to parse model list response")?;

        Ok(listing
            .models
            .into_iter()
            .map(|m| ModelInfo {
                name: m.name,
                supported_methods: m.supported_generation_methods,
            })
            .collect())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", GEMINI_API_BASE, model);

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send generation request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            return Err(gemini_error(status, &body));
        }

        let generated: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse generation response")?;

        extract_reply_text(&generated)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 에러 응답 본문에서 Gemini 에러 메시지 추출
fn gemini_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<GeminiError>(body) {
        Ok(err) => anyhow::anyhow!(
            "Gemini API error ({}): {}",
            err.error.status,
            err.error.message
        ),
        Err(_) => anyhow::anyhow!("Gemini API error ({}): {}", status, body),
    }
}

/// 첫 번째 후보의 텍스트 파트를 이어붙여 반환
///
/// 후보가 없거나 텍스트가 비어 있으면 에러입니다.
fn extract_reply_text(response: &GenerateResponse) -> Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| anyhow::anyhow!("Gemini API returned no candidates"))?;

    let content = candidate
        .content
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Gemini API candidate has no content"))?;

    let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();

    if text.is_empty() {
        anyhow::bail!("Gemini API returned empty text");
    }

    Ok(text)
}

// ============================================================================
// Tests
// ============================================================================
