//! palank-reply - RAG 기반 고객 지원 자동 답변 서버
//!
//! 지식베이스 키워드 검색과 Gemini 텍스트 생성을 결합하여
//! 지원 티켓에 대한 답변 초안을 작성합니다.
//! 인용한 문서는 응답의 sources 목록으로 반환됩니다.

pub mod cli;
pub mod config;
pub mod gemini;
pub mod knowledge;
pub mod prompt;
pub mod reply;
pub mod server;

// Re-exports
pub use config::{get_data_dir, AppConfig};
pub use gemini::{
    get_api_key, has_api_key, GeminiClient, GenerationProvider, ModelInfo, ModelSelector,
    DEFAULT_MODEL,
};
pub use knowledge::{
    search, KnowledgeDocument, KnowledgeStore, LoadOutcome, RetrievalResult, NO_MATCH_MESSAGE,
};
pub use prompt::build_prompt;
pub use reply::{ReplyError, ReplyPipeline, ReplyResponse, Ticket};
pub use server::{build_router, AppState};
