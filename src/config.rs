//! 설정 모듈 - 프로세스 시작 시 주입되는 구성 값
//!
//! 자격 증명과 지식베이스 경로를 프로세스 시작 시 한 번 읽어
//! 각 컴포넌트에 명시적으로 전달합니다.
//! 요청 처리 중에는 환경변수를 다시 읽지 않습니다.

use std::path::PathBuf;

use crate::gemini::get_api_key;

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (~/.palank-reply/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".palank-reply")
}

/// 기본 지식베이스 파일 경로 (~/.palank-reply/knowledge.json)
pub fn default_knowledge_path() -> PathBuf {
    get_data_dir().join("knowledge.json")
}

// ============================================================================
// AppConfig
// ============================================================================

/// 애플리케이션 설정
///
/// 프로세스 시작 시 한 번 생성되어 서버와 파이프라인에 주입됩니다.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini API 키 (없으면 /generate 요청이 500으로 응답)
    pub api_key: Option<String>,
    /// 지식베이스 JSON 파일 경로
    pub knowledge_path: PathBuf,
}

impl AppConfig {
    /// 환경변수에서 설정 로드
    ///
    /// - API 키: `GEMINI_API_KEY` > `GOOGLE_AI_API_KEY`
    /// - 지식베이스 경로: `PALANK_REPLY_KNOWLEDGE`
    ///   (기본값: ~/.palank-reply/knowledge.json)
    pub fn from_env() -> Self {
        let api_key = get_api_key().ok();

        let knowledge_path = std::env::var("PALANK_REPLY_KNOWLEDGE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_knowledge_path());

        Self {
            api_key,
            knowledge_path,
        }
    }

    /// API 키 설정 여부
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_knowledge_path() {
        let path = default_knowledge_path();
        assert!(path.ends_with("knowledge.json"));
        assert!(path.to_string_lossy().contains(".palank-reply"));
    }

    #[test]
    fn test_has_api_key() {
        let config = AppConfig {
            api_key: Some("fake-key".to_string()),
            knowledge_path: PathBuf::from("knowledge.json"),
        };
        assert!(config.has_api_key());

        let config = AppConfig {
            api_key: None,
            knowledge_path: PathBuf::from("knowledge.json"),
        };
        assert!(!config.has_api_key());
    }
}
