//! Knowledge Store - JSON 파일 기반 문서 저장소
//!
//! 지식베이스(제목/본문 쌍의 목록)를 JSON 파일에서 읽어옵니다.
//! 읽기/파싱에 실패해도 요청이 실패하지 않도록 빈 문서 집합으로
//! degrade 하며, 실패는 로그로만 남깁니다.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::default_knowledge_path;

// ============================================================================
// Types
// ============================================================================

/// 지식 문서 (제목 + 본문)
///
/// 로드 이후 불변이며, 별도 ID 없이 배열 내 위치로 식별됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub title: String,
    pub content: String,
}

/// 로드 결과
///
/// 로드 실패는 오류가 아니라 `Empty` 변형으로 표현됩니다.
/// 지식베이스가 없어도 파이프라인은 degraded 상태로 계속 동작합니다.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// 정상 로드된 문서 목록 (파일 내 순서 유지)
    Loaded(Vec<KnowledgeDocument>),
    /// 읽기 또는 파싱 실패 - 빈 문서 집합으로 대체
    Empty,
}

impl LoadOutcome {
    /// 문서 목록으로 변환 (`Empty`는 빈 Vec)
    pub fn into_documents(self) -> Vec<KnowledgeDocument> {
        match self {
            LoadOutcome::Loaded(docs) => docs,
            LoadOutcome::Empty => Vec::new(),
        }
    }

    /// 정상 로드 여부
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

// ============================================================================
// KnowledgeStore
// ============================================================================

/// Knowledge Store - JSON 파일 문서 저장소
///
/// 매 요청마다 파일을 새로 읽습니다. 문서 수가 작고, 외부에서 파일을
/// 교체하면 재시작 없이 다음 요청부터 반영되어야 하므로 캐시하지 않습니다.
pub struct KnowledgeStore {
    path: PathBuf,
}

impl KnowledgeStore {
    /// 지정된 경로로 저장소 생성
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 기본 위치로 생성 (~/.palank-reply/knowledge.json)
    pub fn open_default() -> Self {
        Self::new(default_knowledge_path())
    }

    /// 파일 경로 반환
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 문서 집합 로드
    ///
    /// 실패 시 warn 로그 후 `LoadOutcome::Empty`를 반환합니다.
    /// 어떤 경우에도 에러를 전파하지 않습니다.
    pub fn load(&self) -> LoadOutcome {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read knowledge base {:?}: {}", self.path, e);
                return LoadOutcome::Empty;
            }
        };

        match serde_json::from_str::<Vec<KnowledgeDocument>>(&raw) {
            Ok(docs) => {
                tracing::debug!(
                    "Loaded {} knowledge documents from {:?}",
                    docs.len(),
                    self.path
                );
                LoadOutcome::Loaded(docs)
            }
            Err(e) => {
                tracing::warn!("Failed to parse knowledge base {:?}: {}", self.path, e);
                LoadOutcome::Empty
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_knowledge(dir: &TempDir, json: &str) -> KnowledgeStore {
        let path = dir.path().join("knowledge.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        KnowledgeStore::new(path)
    }

    #[test]
    fn test_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = write_knowledge(
            &dir,
            r#"[
                {"title": "첫 번째", "content": "내용 A"},
                {"title": "두 번째", "content": "내용 B"},
                {"title": "세 번째", "content": "내용 C"}
            ]"#,
        );

        let outcome = store.load();
        assert!(outcome.is_loaded());

        let docs = outcome.into_documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].title, "첫 번째");
        assert_eq!(docs[1].title, "두 번째");
        assert_eq!(docs[2].title, "세 번째");
    }

    #[test]
    fn test_load_missing_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::new(dir.path().join("nonexistent.json"));

        let outcome = store.load();
        assert!(!outcome.is_loaded());
        assert!(outcome.into_documents().is_empty());
    }

    #[test]
    fn test_load_malformed_json_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = write_knowledge(&dir, "{ this is not json ]");

        let outcome = store.load();
        assert!(!outcome.is_loaded());
        assert!(outcome.into_documents().is_empty());
    }

    #[test]
    fn test_load_wrong_shape_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        // 배열이 아닌 객체는 파싱 실패로 처리
        let store = write_knowledge(&dir, r#"{"title": "단일 객체", "content": "x"}"#);

        let outcome = store.load();
        assert!(!outcome.is_loaded());
    }

    #[test]
    fn test_load_empty_array() {
        let dir = TempDir::new().unwrap();
        let store = write_knowledge(&dir, "[]");

        let outcome = store.load();
        assert!(outcome.is_loaded());
        assert!(outcome.into_documents().is_empty());
    }
}
