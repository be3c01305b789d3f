//! 모델 선택 - 생성 가능 모델 탐색 + 폴백
//!
//! 프로바이더의 모델 목록에서 generateContent를 지원하는 첫 모델을
//! 선택합니다. 목록 조회 실패는 요청을 막지 않고 기본 모델로
//! 폴백합니다 - 선택은 best-effort이며 절대 에러를 반환하지 않습니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::{GenerationProvider, ModelInfo, DEFAULT_MODEL};

/// 생성 기능 식별자
const GENERATE_CAPABILITY: &str = "generateContent";

/// 캐시 갱신 주기
///
/// 선택된 모델은 프로세스 수명 동안 거의 변하지 않으므로
/// 요청마다 목록을 조회하지 않고 주기적으로만 갱신합니다.
const REFRESH_INTERVAL: Duration = Duration::from_secs(600);

// ============================================================================
// ModelSelector
// ============================================================================

/// 선택 캐시 엔트리
#[derive(Debug, Clone)]
struct CachedChoice {
    model: String,
    selected_at: Instant,
}

/// 모델 선택기
///
/// 선택 결과를 Mutex 뒤에 캐시합니다. 실패한 목록 조회는 캐시하지
/// 않으므로 다음 요청에서 즉시 재시도됩니다.
pub struct ModelSelector {
    provider: Arc<dyn GenerationProvider>,
    cached: Mutex<Option<CachedChoice>>,
}

impl ModelSelector {
    /// 새 선택기 생성
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }

    /// 사용할 모델 식별자 선택
    ///
    /// 항상 사용 가능한 식별자를 반환합니다. 조회 실패 시에는
    /// 이전 선택(있다면)을 유지하고, 없으면 기본 모델로 폴백합니다.
    pub async fn select(&self) -> String {
        let mut cached = self.cached.lock().await;

        if let Some(choice) = cached.as_ref() {
            if choice.selected_at.elapsed() < REFRESH_INTERVAL {
                return choice.model.clone();
            }
        }

        match self.provider.list_models().await {
            Ok(models) => match pick_model(&models) {
                Some(model) => {
                    tracing::info!("Selected generation model: {}", model);
                    *cached = Some(CachedChoice {
                        model: model.clone(),
                        selected_at: Instant::now(),
                    });
                    model
                }
                None => {
                    tracing::warn!(
                        "No generation-capable model in listing, falling back to {}",
                        DEFAULT_MODEL
                    );
                    DEFAULT_MODEL.to_string()
                }
            },
            Err(e) => {
                if let Some(choice) = cached.as_ref() {
                    tracing::warn!(
                        "Model listing failed ({}), keeping previous choice {}",
                        e,
                        choice.model
                    );
                    choice.model.clone()
                } else {
                    tracing::warn!(
                        "Model listing failed ({}), falling back to {}",
                        e,
                        DEFAULT_MODEL
                    );
                    DEFAULT_MODEL.to_string()
                }
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 목록에서 생성 가능한 첫 모델 선택
///
/// 프로바이더 제공 순서를 따르며, "models/" 접두사는 제거합니다.
fn pick_model(models: &[ModelInfo]) -> Option<String> {
    models
        .iter()
        .find(|m| {
            m.supported_methods
                .iter()
                .any(|method| method == GENERATE_CAPABILITY)
        })
        .map(|m| m.name.strip_prefix("models/").unwrap_or(&m.name).to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 테스트용 프로바이더 - 호출 횟수를 세고 고정 목록 또는 에러를 반환
    struct FakeProvider {
        models: Option<Vec<ModelInfo>>,
        list_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn with_models(models: Vec<ModelInfo>) -> Self {
            Self {
                models: Some(models),
                list_calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                models: None,
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for FakeProvider {
        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            match &self.models {
                Some(models) => Ok(models.clone()),
                None => anyhow::bail!("listing unavailable"),
            }
        }

        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
            Ok("unused".to_string())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn model(name: &str, methods: &[&str]) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            supported_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_pick_first_generation_capable_model() {
        let models = vec![
            model("models/embedding-001", &["embedContent"]),
            model("models/gemini-1.5-flash", &["generateContent"]),
            model("models/gemini-1.5-pro", &["generateContent"]),
        ];

        assert_eq!(pick_model(&models), Some("gemini-1.5-flash".to_string()));
    }

    #[test]
    fn test_pick_model_none_capable() {
        let models = vec![model("models/embedding-001", &["embedContent"])];
        assert_eq!(pick_model(&models), None);

        assert_eq!(pick_model(&[]), None);
    }

    #[tokio::test]
    async fn test_select_falls_back_on_listing_failure() {
        let selector = ModelSelector::new(Arc::new(FakeProvider::failing()));
        assert_eq!(selector.select().await, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_select_falls_back_when_nothing_capable() {
        let provider = FakeProvider::with_models(vec![model(
            "models/embedding-001",
            &["embedContent"],
        )]);
        let selector = ModelSelector::new(Arc::new(provider));
        assert_eq!(selector.select().await, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_select_caches_choice() {
        let provider = Arc::new(FakeProvider::with_models(vec![model(
            "models/gemini-1.5-flash",
            &["generateContent"],
        )]));
        let selector = ModelSelector::new(provider.clone());

        assert_eq!(selector.select().await, "gemini-1.5-flash");
        assert_eq!(selector.select().await, "gemini-1.5-flash");

        // 두 번째 호출은 캐시에서 응답 - 목록 조회는 한 번만
        assert_eq!(provider.list_calls.load(Ordering::SeqCst), 1);
    }
}
