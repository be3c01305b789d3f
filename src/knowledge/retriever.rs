//! Retriever - 키워드 포함 매칭 검색
//!
//! 쿼리를 공백으로 토큰화한 뒤, 각 문서의 제목+본문에 대한
//! 부분 문자열 포함 여부로 문서를 선별합니다.
//! 스코어 기반 정렬 없이 로드 순서를 유지합니다.

use super::store::KnowledgeDocument;

// ============================================================================
// Constants
// ============================================================================

/// 매칭 문서가 없을 때 사용하는 고정 메시지
pub const NO_MATCH_MESSAGE: &str = "관련된 사내 문서를 찾을 수 없습니다.";

// ============================================================================
// RetrievalResult
// ============================================================================

/// 검색 결과
///
/// 소스 시퀀스는 비어 있지 않습니다 - 매칭 문서가 없으면
/// `NoMatch`가 고정 메시지 한 건을 대신 제공합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalResult {
    /// 매칭된 문서 발췌 목록 (로드 순서 유지)
    Hits(Vec<String>),
    /// 매칭 없음
    NoMatch,
}

impl RetrievalResult {
    /// 인용 소스 목록
    ///
    /// 항상 1개 이상의 요소를 반환합니다 (`NoMatch`는 고정 메시지 1건).
    pub fn sources(&self) -> Vec<String> {
        match self {
            RetrievalResult::Hits(excerpts) => excerpts.clone(),
            RetrievalResult::NoMatch => vec![NO_MATCH_MESSAGE.to_string()],
        }
    }

    /// 프롬프트 삽입용 참고 자료 텍스트 (발췌를 빈 줄로 연결)
    pub fn context_text(&self) -> String {
        self.sources().join("\n\n")
    }

    /// 매칭 문서 존재 여부
    pub fn has_hits(&self) -> bool {
        matches!(self, RetrievalResult::Hits(_))
    }
}

// ============================================================================
// Search
// ============================================================================

/// 키워드 검색
///
/// 쿼리를 공백(전각 공백 포함)으로 토큰화하고 소문자화한 뒤,
/// 각 문서의 제목+본문 연결 문자열(소문자)에 토큰이 하나라도
/// 포함되면 결과에 넣습니다. 매칭 토큰 수는 포함 판정(1개 이상)에만
/// 쓰이고 결과 순서에는 영향을 주지 않습니다.
pub fn search(query: &str, documents: &[KnowledgeDocument]) -> RetrievalResult {
    // split_whitespace는 전각 공백(U+3000)을 포함한 유니코드 공백을 모두 분리
    let tokens: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    let mut hits = Vec::new();

    for doc in documents {
        let haystack = format!("{}{}", doc.title, doc.content).to_lowercase();

        let match_count = tokens
            .iter()
            .filter(|token| haystack.contains(token.as_str()))
            .count();

        if match_count >= 1 {
            hits.push(format_excerpt(doc));
        }
    }

    if hits.is_empty() {
        RetrievalResult::NoMatch
    } else {
        RetrievalResult::Hits(hits)
    }
}

/// 문서 발췌 포맷 (【제목】 + 줄바꿈 + 본문)
fn format_excerpt(doc: &KnowledgeDocument) -> String {
    format!("【{}】\n{}", doc.title, doc.content)
}

// ============================================================================
// Tests
// ============================================================================
