//! The fixed prompt template.

use docchat_session::{ConversationTurn, Role};

/// Static framing placed at the top of every prompt.
pub const SYSTEM_FRAMING: &str = "The following is a friendly conversation between a Human and an AI assistant.\n\
The AI assistant is helpful, creative, clever, and very friendly.";

const CONTEXT_HEADER: &str = "Context information from relevant documents:";
const HUMAN: &str = "Human:";
const ASSISTANT: &str = "AI Assistant:";

/// Render the prompt for one turn.
///
/// Pure: the output depends only on the arguments. `history` is rendered in
/// order between the context block and the new user text.
pub fn render_prompt(context: &str, history: &[ConversationTurn], user_text: &str) -> String {
    let mut prompt = String::with_capacity(
        SYSTEM_FRAMING.len() + context.len() + user_text.len() + 128,
    );
    prompt.push_str(SYSTEM_FRAMING);
    prompt.push_str("\n\n");
    prompt.push_str(CONTEXT_HEADER);
    prompt.push('\n');
    prompt.push_str(context);
    prompt.push_str("\n\n");

    for turn in history {
        let speaker = match turn.role {
            Role::User => HUMAN,
            Role::Assistant => ASSISTANT,
        };
        prompt.push_str(speaker);
        prompt.push(' ');
        prompt.push_str(&turn.text);
        prompt.push('\n');
    }

    prompt.push_str(HUMAN);
    prompt.push(' ');
    prompt.push_str(user_text);
    prompt.push('\n');
    prompt.push_str(ASSISTANT);
    prompt
}

/// Join retrieved chunk texts into the context block, keeping rank order.
pub fn context_block<'a>(chunks: impl IntoIterator<Item = &'a str>) -> String {
    chunks.into_iter().collect::<Vec<_>>().join("\n")
}
