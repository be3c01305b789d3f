//! Reply 모듈 - 요청/응답 계약 + 답변 파이프라인
//!
//! 티켓 → 검색 → 모델 선택 → 프롬프트 → 생성 → 응답 조립을
//! 한 요청 단위로 수행합니다. 부분 응답은 없습니다 -
//! `ReplyResponse` 또는 `ReplyError` 중 하나만 반환됩니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::gemini::{GeminiClient, GenerationProvider, ModelSelector};
use crate::knowledge::{self, KnowledgeStore};
use crate::prompt::build_prompt;

// ============================================================================
// Contract Types
// ============================================================================

/// 지원 티켓 (요청 본문)
///
/// 두 필드 모두 생략 가능하며 빈 문자열로 기본 설정됩니다.
/// 요청 범위에서만 존재하고 저장되지 않습니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ticket {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

/// 성공 응답 계약
#[derive(Debug, Clone, Serialize)]
pub struct ReplyResponse {
    /// 생성된 답변 본문
    pub reply_body: String,
    /// 인용된 소스 목록 (매칭 없으면 고정 메시지 1건)
    pub sources: Vec<String>,
}

/// 요청 처리 실패
///
/// 호출자에게 노출되는 실패만 변형으로 둡니다. 지식베이스 로드
/// 실패와 모델 선택 실패는 내부에서 degraded 폴백으로 흡수됩니다.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// 자격 증명 미설정
    #[error("API Key not found")]
    MissingApiKey,

    /// 생성 호출 실패
    #[error("{0}")]
    Upstream(String),
}

// ============================================================================
// ReplyPipeline
// ============================================================================

/// 답변 파이프라인
///
/// 프로세스 시작 시 구성되어 모든 요청이 공유합니다.
/// 지식베이스는 매 요청 새로 읽습니다.
pub struct ReplyPipeline {
    store: KnowledgeStore,
    generation: Option<Generation>,
}

/// 생성 관련 구성 요소 (API 키가 있을 때만 존재)
struct Generation {
    provider: Arc<dyn GenerationProvider>,
    selector: ModelSelector,
}

impl ReplyPipeline {
    /// 설정으로 파이프라인 구성
    ///
    /// API 키가 없으면 생성 기능 없이 구성되고, 요청 시점에
    /// `MissingApiKey`로 응답합니다. 프로세스는 계속 동작합니다.
    pub fn from_config(config: &AppConfig) -> Self {
        let store = KnowledgeStore::new(&config.knowledge_path);

        let generation = config.api_key.as_ref().and_then(|key| {
            match GeminiClient::new(key.clone()) {
                Ok(client) => {
                    let provider: Arc<dyn GenerationProvider> = Arc::new(client);
                    Some(Generation {
                        selector: ModelSelector::new(provider.clone()),
                        provider,
                    })
                }
                Err(e) => {
                    tracing::warn!("Failed to create Gemini client: {}", e);
                    None
                }
            }
        });

        Self { store, generation }
    }

    /// 프로바이더를 직접 주입하여 구성 (테스트/대체 프로바이더용)
    pub fn with_provider(store: KnowledgeStore, provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            store,
            generation: Some(Generation {
                selector: ModelSelector::new(provider.clone()),
                provider,
            }),
        }
    }

    /// 자격 증명 설정 여부
    pub fn has_credentials(&self) -> bool {
        self.generation.is_some()
    }

    /// 한 요청 처리
    pub async fn handle(&self, ticket: Ticket) -> Result<ReplyResponse, ReplyError> {
        let Some(generation) = &self.generation else {
            return Err(ReplyError::MissingApiKey);
        };

        // 1. 검색 - 지식베이스는 매 요청 새로 로드
        let documents = self.store.load().into_documents();
        let query = format!("{} {}", ticket.subject, ticket.description);
        let retrieval = knowledge::search(&query, &documents);
        tracing::debug!("Retrieved {} source(s)", retrieval.sources().len());

        // 2. 모델 선택 - 실패는 내부 폴백으로 흡수
        let model = generation.selector.select().await;

        // 3. 프롬프트 생성
        let prompt = build_prompt(&ticket, &retrieval);

        // 4. 생성 호출 - 실패는 호출자에게 그대로 노출
        let reply_body = generation
            .provider
            .generate(&model, &prompt)
            .await
            .map_err(|e| ReplyError::Upstream(e.to_string()))?;

        // 5. 응답 조립
        Ok(ReplyResponse {
            reply_body,
            sources: retrieval.sources(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
