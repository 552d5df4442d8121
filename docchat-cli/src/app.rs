//! Wiring from command-line options to library components.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use docchat_agent::{ChatSession, ConversationEngine, EngineConfig};
use docchat_model::{Llm, MockLlm, OllamaConfig, OllamaModel};
use docchat_rag::{
    DirectoryCorpus, DocumentStore, EmbeddingProvider, HashingEmbedder, LoadOutcome,
    OllamaEmbeddingProvider, RagConfig,
};
use docchat_session::SessionMemory;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, Options};
use crate::repl;

const OFFLINE_REPLY: &str =
    "docchat is running offline, so no language model is available. Use `docchat search` to query the documents.";

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let options = cli.options;
    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat(&options).await,
        Commands::Index => index(&options).await,
        Commands::Search { query, limit } => {
            search(&options, &query.join(" "), limit.unwrap_or(options.top_k)).await
        }
    }
}

pub fn rag_config(options: &Options) -> Result<RagConfig> {
    RagConfig::builder()
        .chunk_size(options.chunk_size)
        .chunk_overlap(options.chunk_overlap)
        .top_k(options.top_k)
        .metric(options.metric.into())
        .build()
        .context("invalid retrieval settings")
}

pub fn engine_config(options: &Options) -> EngineConfig {
    EngineConfig::default()
        .with_top_k(options.top_k)
        .with_history_turns(options.history_turns)
        .with_generation_timeout(Duration::from_secs(options.timeout_secs))
}

pub fn build_embedder(options: &Options) -> Result<Arc<dyn EmbeddingProvider>> {
    if options.offline {
        return Ok(Arc::new(HashingEmbedder::default()));
    }
    let provider = OllamaEmbeddingProvider::new()
        .context("failed to create embedding client")?
        .with_base_url(&options.ollama_url)
        .with_model(&options.embedding_model, options.embedding_dimensions);
    Ok(Arc::new(provider))
}

pub fn build_llm(options: &Options) -> Result<Arc<dyn Llm>> {
    if options.offline {
        return Ok(Arc::new(MockLlm::new(OFFLINE_REPLY).with_name("offline")));
    }
    let config = OllamaConfig::new(&options.model)
        .with_base_url(&options.ollama_url)
        .with_temperature(options.temperature)
        .with_timeout(Duration::from_secs(options.timeout_secs));
    Ok(Arc::new(OllamaModel::new(config).context("failed to create model client")?))
}

pub fn build_store(options: &Options) -> Result<Arc<DocumentStore>> {
    let store = DocumentStore::builder()
        .config(rag_config(options)?)
        .corpus(Arc::new(DirectoryCorpus::new(&options.docs_dir)))
        .embedding_provider(build_embedder(options)?)
        .persist_dir(&options.store_dir)
        .build()
        .context("failed to configure document store")?;
    Ok(Arc::new(store))
}

async fn chat(options: &Options) -> Result<()> {
    let store = build_store(options)?;
    match store.load().await {
        Ok(outcome) => report_load(&outcome),
        Err(e) => warn!(error = %e, "index unavailable, answers will lack document context"),
    }

    let engine = ConversationEngine::new(store, build_llm(options)?)
        .with_config(engine_config(options));
    let memory = SessionMemory::restore(&options.history_file);
    let mut session = ChatSession::new(engine, memory);
    repl::run(&mut session).await
}

async fn index(options: &Options) -> Result<()> {
    let store = build_store(options)?;
    let outcome = store.rebuild().await.context("failed to build the index")?;
    report_load(&outcome);
    if let LoadOutcome::Built(report) = &outcome {
        println!(
            "Indexed {} document(s) into {} chunk(s) at {}",
            report.documents,
            report.entries,
            store.persist_dir().display()
        );
        for skipped in &report.skipped {
            println!("  skipped {skipped}");
        }
    }
    Ok(())
}

async fn search(options: &Options, query: &str, limit: usize) -> Result<()> {
    let store = build_store(options)?;
    let results = store.search_top_k(query, limit).await.context("search failed")?;
    if results.is_empty() {
        println!("No matching chunks.");
        return Ok(());
    }
    for (rank, result) in results.iter().enumerate() {
        println!("{}. [{:.3}] {}", rank + 1, result.score, result.chunk.document_id);
        println!("   {}", result.chunk.text.replace('\n', "\n   "));
    }
    Ok(())
}

fn report_load(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Restored { entries } => info!(entries, "using persisted index"),
        LoadOutcome::Built(report) => {
            info!(
                documents = report.documents,
                skipped = report.skipped.len(),
                entries = report.entries,
                persisted = report.persisted,
                "built index"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn options(args: &[&str]) -> Options {
        let mut argv = vec!["docchat"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().options
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let opts = options(&["--chunk-size", "100", "--chunk-overlap", "100"]);
        assert!(rag_config(&opts).is_err());
    }

    #[test]
    fn offline_uses_hashing_embeddings() {
        let opts = options(&["--offline"]);
        let embedder = build_embedder(&opts).unwrap();
        assert!(embedder.model_id().starts_with("hashing-"));
        assert_eq!(build_llm(&opts).unwrap().name(), "offline");
    }

    #[tokio::test]
    async fn offline_search_over_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let docs = temp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("visabridge.txt"), "VisaBridge supports 40 countries.").unwrap();

        let docs_arg = docs.display().to_string();
        let store_arg = temp.path().join("store").display().to_string();
        let opts =
            options(&["--offline", "--docs-dir", &docs_arg, "--store-dir", &store_arg]);

        let store = build_store(&opts).unwrap();
        let results = store.search_top_k("How many countries?", 1).await.unwrap();
        assert!(results[0].chunk.text.contains("40 countries."));
    }
}
