//! Gemini 모듈 - 텍스트 생성 프로바이더
//!
//! Gemini API를 통한 모델 목록 조회와 답변 텍스트 생성을 제공합니다.
//!
//! ## 사용법
//! ```rust,ignore
//! let client = GeminiClient::from_env()?;
//! let selector = ModelSelector::new(Arc::new(client));
//! let model = selector.select().await;
//! ```

mod client;
mod selector;

use anyhow::Result;
use async_trait::async_trait;

// Re-exports
pub use client::{GeminiClient, DEFAULT_MODEL};
pub use selector::ModelSelector;

// ============================================================================
// GenerationProvider Trait
// ============================================================================

/// 모델 정보 (목록 조회 결과)
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// 모델 식별자 (예: "models/gemini-1.5-flash")
    pub name: String,
    /// 지원 기능 목록 (예: "generateContent")
    pub supported_methods: Vec<String>,
}

/// 텍스트 생성 프로바이더 트레이트
///
/// 모델 목록 조회와 프롬프트 기반 텍스트 생성 인터페이스입니다.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// 사용 가능한 모델 목록 조회 (프로바이더 제공 순서 유지)
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// 지정된 모델로 텍스트 생성 (단일 시도, 재시도 없음)
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// 프로바이더 이름
    fn name(&self) -> &str;
}

// ============================================================================
// API Key Management
// ============================================================================

/// API 키 로드 (환경변수에서)
///
/// 우선순위:
/// 1. `GEMINI_API_KEY` 환경변수
/// 2. `GOOGLE_AI_API_KEY` 환경변수
pub fn get_api_key() -> Result<String> {
    // 1. GEMINI_API_KEY 확인
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            tracing::debug!("Using API key from GEMINI_API_KEY");
            return Ok(key);
        }
    }

    // 2. GOOGLE_AI_API_KEY 확인 (대체)
    if let Ok(key) = std::env::var("GOOGLE_AI_API_KEY") {
        if !key.is_empty() {
            tracing::debug!("Using API key from GOOGLE_AI_API_KEY");
            return Ok(key);
        }
    }

    anyhow::bail!(
        "API key not found. Set GEMINI_API_KEY or GOOGLE_AI_API_KEY environment variable.\n\
         Get your API key at: https://aistudio.google.com/app/apikey"
    )
}

/// API 키 존재 여부 확인
pub fn has_api_key() -> bool {
    get_api_key().is_ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_api_key() {
        // 환경변수 설정 여부에 따라 결과가 달라짐
        let _ = has_api_key();
    }

    #[test]
    fn test_model_info_clone() {
        let info = ModelInfo {
            name: "models/gemini-1.5-flash".to_string(),
            supported_methods: vec!["generateContent".to_string()],
        };
        let cloned = info.clone();
        assert_eq!(cloned.name, info.name);
        assert_eq!(cloned.supported_methods, info.supported_methods);
    }
}
