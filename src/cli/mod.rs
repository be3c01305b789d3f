//! CLI 모듈
//!
//! palank-reply CLI 명령어 정의 및 구현

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::gemini::has_api_key;
use crate::knowledge::{self, KnowledgeStore, LoadOutcome, RetrievalResult};
use crate::reply::ReplyPipeline;
use crate::server::{self, AppState};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "palank-reply")]
#[command(version, about = "RAG 기반 고객 지원 자동 답변 서버", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTP 서버 실행
    Serve {
        /// 바인드 호스트
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// 바인드 포트
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// 지식베이스 JSON 파일 경로 (기본값: 환경변수 또는 ~/.palank-reply/knowledge.json)
        #[arg(short, long)]
        knowledge: Option<PathBuf>,
    },

    /// 지식베이스 키워드 검색 (서버 없이 로컬 확인용)
    Query {
        /// 검색 쿼리
        query: String,

        /// 지식베이스 JSON 파일 경로
        #[arg(short, long)]
        knowledge: Option<PathBuf>,
    },

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            host,
            port,
            knowledge,
        } => cmd_serve(&host, port, knowledge).await,
        Commands::Query { query, knowledge } => cmd_query(&query, knowledge).await,
        Commands::Status => cmd_status().await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 서버 실행 명령어 (serve)
async fn cmd_serve(host: &str, port: u16, knowledge: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(path) = knowledge {
        config.knowledge_path = path;
    }

    if !config.has_api_key() {
        println!("[!] API 키가 설정되지 않았습니다. /generate 요청은 500으로 응답합니다.");
        println!("    설정: export GEMINI_API_KEY=your-key");
    }

    println!("[*] 지식베이스: {}", config.knowledge_path.display());

    let pipeline = ReplyPipeline::from_config(&config);
    let state = Arc::new(AppState { pipeline });

    server::run(state, host, port).await
}

/// 검색 명령어 (query)
///
/// 서버를 띄우지 않고 지식베이스 매칭 결과를 확인합니다.
async fn cmd_query(query: &str, knowledge: Option<PathBuf>) -> Result<()> {
    let store = match knowledge {
        Some(path) => KnowledgeStore::new(path),
        None => {
            let config = AppConfig::from_env();
            KnowledgeStore::new(&config.knowledge_path)
        }
    };

    let outcome = store.load();
    if !outcome.is_loaded() {
        println!(
            "[!] 지식베이스를 읽을 수 없습니다: {}",
            store.path().display()
        );
    }
    let documents = outcome.into_documents();

    println!("[*] 검색 중: \"{}\" ({} 문서)", query, documents.len());

    match knowledge::search(query, &documents) {
        RetrievalResult::Hits(excerpts) => {
            println!("\n[OK] 검색 결과 ({} 건):\n", excerpts.len());
            for (i, excerpt) in excerpts.iter().enumerate() {
                println!("{}. {}", i + 1, excerpt);
                println!();
            }
        }
        RetrievalResult::NoMatch => {
            println!("\n[!] {}", knowledge::NO_MATCH_MESSAGE);
        }
    }

    Ok(())
}

/// 상태 명령어 (status)
async fn cmd_status() -> Result<()> {
    println!("palank-reply v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = AppConfig::from_env();

    // API 키 상태
    if has_api_key() {
        println!("[OK] API 키: 설정됨");
    } else {
        println!("[!] API 키: 미설정");
        println!("    설정: export GEMINI_API_KEY=your-key");
    }

    // 지식베이스 상태
    println!("[*] 지식베이스: {}", config.knowledge_path.display());

    let store = KnowledgeStore::new(&config.knowledge_path);
    match store.load() {
        LoadOutcome::Loaded(docs) => {
            println!("[OK] 문서 수: {} 건", docs.len());
        }
        LoadOutcome::Empty => {
            println!("[!] 지식베이스를 읽을 수 없습니다 (빈 집합으로 동작)");
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["palank-reply", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port, knowledge } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 5000);
                assert!(knowledge.is_none());
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_parse_query_with_knowledge_path() {
        let cli = Cli::try_parse_from([
            "palank-reply",
            "query",
            "전원 문제",
            "--knowledge",
            "docs.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Query { query, knowledge } => {
                assert_eq!(query, "전원 문제");
                assert_eq!(knowledge, Some(PathBuf::from("docs.json")));
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["palank-reply"]).is_err());
    }
}
