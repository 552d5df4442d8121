//! # docchat-session
//!
//! The durable conversation transcript.
//!
//! [`SessionMemory`] owns an ordered list of [`ConversationTurn`]s and mirrors
//! it to a JSON file. Writes go through a temp file and a rename, so a crash
//! leaves either the previous transcript or the new one.
//!
//! ```rust,no_run
//! use docchat_session::{ConversationTurn, SessionMemory};
//!
//! let mut memory = SessionMemory::restore("chat_history.json");
//! memory.append(ConversationTurn::user("How many countries?"));
//! memory.append(ConversationTurn::assistant("Forty."));
//! memory.persist()?;
//! # Ok::<(), docchat_session::SessionError>(())
//! ```

pub mod error;
pub mod memory;
pub mod turn;

pub use error::{Result, SessionError};
pub use memory::{DEFAULT_TRANSCRIPT_FILE, SessionMemory, read_transcript, write_transcript};
pub use turn::{ConversationTurn, Role, Transcript};
