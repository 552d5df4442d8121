use std::fs;

use docchat_session::{
    ConversationTurn, Role, SessionError, SessionMemory, read_transcript,
};

fn three_turns() -> Vec<ConversationTurn> {
    vec![
        ConversationTurn::user("How many countries does VisaBridge support?"),
        ConversationTurn::assistant("VisaBridge supports 40 countries."),
        ConversationTurn::user("Thanks!"),
    ]
}

#[test]
fn turns_survive_a_restart_in_order() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");

    let mut memory = SessionMemory::restore(&path);
    assert!(memory.is_empty());
    for turn in three_turns() {
        memory.append(turn);
        memory.persist().unwrap();
    }
    drop(memory);

    let restored = SessionMemory::restore(&path);
    assert_eq!(restored.all(), three_turns().as_slice());
}

#[test]
fn missing_file_starts_empty() {
    let temp = tempfile::tempdir().unwrap();
    let memory = SessionMemory::restore(temp.path().join("nope.json"));
    assert!(memory.is_empty());
}

#[test]
fn malformed_file_starts_empty_and_is_overwritten() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    fs::write(&path, "[{\"role\": \"user\", \"te").unwrap();

    assert!(matches!(read_transcript(&path), Err(SessionError::Malformed { .. })));

    let mut memory = SessionMemory::restore(&path);
    assert!(memory.is_empty());

    memory.append(ConversationTurn::user("hello"));
    memory.persist().unwrap();
    assert_eq!(read_transcript(&path).unwrap().unwrap().len(), 1);
}

#[test]
fn reads_transcripts_keyed_by_content() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    fs::write(
        &path,
        r#"[{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]"#,
    )
    .unwrap();

    let memory = SessionMemory::restore(&path);
    assert_eq!(memory.len(), 2);
    assert_eq!(memory.all()[1].role, Role::Assistant);
    assert_eq!(memory.all()[1].text, "hello");
}

#[test]
fn persisted_file_is_a_json_list_of_records() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nested").join("chat.json");
    let mut memory = SessionMemory::restore(&path);
    memory.append(ConversationTurn::user("hi"));
    memory.persist().unwrap();

    let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(value[0]["role"], "user");
    assert_eq!(value[0]["text"], "hi");
}

#[test]
fn clear_empties_memory_and_removes_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chat_history.json");
    let mut memory = SessionMemory::restore(&path);
    memory.append(ConversationTurn::user("hi"));
    memory.persist().unwrap();

    memory.clear().unwrap();
    assert!(memory.is_empty());
    assert!(!path.exists());

    // Nothing left to remove.
    memory.clear().unwrap();
}

#[test]
fn in_memory_session_never_writes() {
    let mut memory = SessionMemory::in_memory();
    memory.append(ConversationTurn::user("hi"));
    memory.persist().unwrap();
    assert!(memory.path().is_none());
    memory.clear().unwrap();
    assert!(memory.is_empty());
}
