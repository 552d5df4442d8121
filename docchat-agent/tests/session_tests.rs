use std::path::Path;
use std::sync::Arc;

use docchat_agent::{ChatSession, ConversationEngine, DIAGNOSTIC_PREFIX};
use docchat_model::MockLlm;
use docchat_rag::{Document, DocumentStore, HashingEmbedder, InMemoryCorpus, LoadOutcome};
use docchat_session::{ConversationTurn, Role, SessionMemory, read_transcript, write_transcript};

fn engine(dir: &Path, llm: Arc<MockLlm>) -> ConversationEngine {
    let store = DocumentStore::builder()
        .corpus(Arc::new(InMemoryCorpus::new(vec![Document::new(
            "visabridge.txt",
            "VisaBridge supports 40 countries.",
        )])))
        .embedding_provider(Arc::new(HashingEmbedder::new(256)))
        .persist_dir(dir.join("vector_store"))
        .build()
        .unwrap();
    ConversationEngine::new(Arc::new(store), llm)
}

#[tokio::test]
async fn each_exchange_is_persisted() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    let llm = Arc::new(MockLlm::new("VisaBridge supports 40 countries."));
    let mut session = ChatSession::new(engine(temp.path(), llm), SessionMemory::restore(&path));

    let reply = session.send("How many countries?").await;
    assert_eq!(reply, "VisaBridge supports 40 countries.");

    let stored = read_transcript(&path).unwrap().unwrap();
    assert_eq!(
        stored,
        vec![
            ConversationTurn::user("How many countries?"),
            ConversationTurn::assistant("VisaBridge supports 40 countries."),
        ]
    );
}

#[tokio::test]
async fn failed_generation_still_records_both_turns() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    let llm = Arc::new(MockLlm::failing("model unavailable"));
    let mut session = ChatSession::new(engine(temp.path(), llm), SessionMemory::restore(&path));

    let reply = session.send("hello").await;

    assert!(reply.starts_with(DIAGNOSTIC_PREFIX));
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], ConversationTurn::user("hello"));
    assert_eq!(transcript[1].role, Role::Assistant);
    assert_eq!(transcript[1].text, reply);
    assert!(transcript[1].diagnostic);
    assert_eq!(read_transcript(&path).unwrap().unwrap().len(), 2);
}

#[tokio::test]
async fn restart_replays_both_roles_without_calling_the_model() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    write_transcript(
        &path,
        &[
            ConversationTurn::user("My name is Sam."),
            ConversationTurn::assistant("Nice to meet you, Sam."),
            ConversationTurn::user("Are you there?"),
            ConversationTurn::diagnostic(format!("{DIAGNOSTIC_PREFIX}Model unavailable: down")),
        ],
    )
    .unwrap();

    let llm = Arc::new(MockLlm::new("Your name is Sam."));
    let mut session =
        ChatSession::new(engine(temp.path(), llm.clone()), SessionMemory::restore(&path));
    assert!(llm.requests().is_empty());
    assert_eq!(session.transcript().len(), 4);
    assert_eq!(session.engine().history().len(), 2);

    session.send("What is my name?").await;

    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains(
        "Human: My name is Sam.\nAI Assistant: Nice to meet you, Sam.\nHuman: What is my name?"
    ));
    assert!(!prompt.contains("Are you there?"));
    assert_eq!(session.transcript().len(), 6);
}

#[tokio::test]
async fn replay_keeps_real_replies_that_look_like_errors() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    write_transcript(
        &path,
        &[
            ConversationTurn::user("Quote the crash banner."),
            ConversationTurn::assistant(format!("{DIAGNOSTIC_PREFIX}disk full")),
        ],
    )
    .unwrap();

    let llm = Arc::new(MockLlm::new("ok"));
    let session = ChatSession::new(engine(temp.path(), llm), SessionMemory::restore(&path));
    assert_eq!(session.engine().history().len(), 2);
}

#[tokio::test]
async fn unwritable_transcript_keeps_the_conversation_going() {
    let temp = tempfile::tempdir().unwrap();
    let blocker = temp.path().join("not_a_dir");
    std::fs::write(&blocker, "regular file").unwrap();
    let path = blocker.join("chat_history.json");

    let llm = Arc::new(MockLlm::new("Still here."));
    let mut session = ChatSession::new(engine(temp.path(), llm), SessionMemory::restore(&path));

    assert_eq!(session.send("hello").await, "Still here.");
    assert_eq!(
        session.transcript(),
        &[ConversationTurn::user("hello"), ConversationTurn::assistant("Still here.")]
    );
    assert!(!path.exists());
}

#[tokio::test]
async fn clear_forgets_everything() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    let llm = Arc::new(MockLlm::new("ok"));
    let mut session =
        ChatSession::new(engine(temp.path(), llm.clone()), SessionMemory::restore(&path));

    session.send("remember this").await;
    session.clear().unwrap();

    assert!(session.transcript().is_empty());
    assert!(session.engine().history().is_empty());
    assert!(!path.exists());

    session.send("anything?").await;
    assert!(!llm.last_prompt().unwrap().contains("remember this"));
}

#[tokio::test]
async fn reindex_rebuilds_the_store() {
    let temp = tempfile::tempdir().unwrap();
    let session = ChatSession::new(
        engine(temp.path(), Arc::new(MockLlm::new("ok"))),
        SessionMemory::in_memory(),
    );

    let outcome = session.reindex().await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Built(_)));
    assert_eq!(outcome.entries(), 1);
}
