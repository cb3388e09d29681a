//! Research assistant core.
//!
//! - [`conversation`]: append-only turn log for the running session
//! - [`prompt`]: ordered message list sent to the model
//! - [`round`]: one submit round, from validation to the stored reply
//! - [`transcript`]: Markdown export of the log
//!
//! The HTTP layer only talks to [`ResearchAssistant::submit`] and the
//! [`Conversation`] it owns.

pub mod api_types;
pub mod conversation;
pub mod error;
pub mod prompt;
pub mod round;
pub mod transcript;

pub use api_types::{RoundOutcome, StatusLevel, StatusMessage, Submission};
pub use conversation::{Conversation, Turn, TurnRole};
pub use error::RoundError;
pub use round::ResearchAssistant;
pub use transcript::{render_markdown, safe_filename};
