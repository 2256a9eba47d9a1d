pub mod session_timer;
pub mod test_session;
pub mod topic_editor;

pub use session_timer::{lock_session, SessionTimer, SharedSession};
pub use test_session::{QuestionFeedback, ScoreReport, SessionStatus, TestSession, TickOutcome};
pub use topic_editor::{clamp_generate_count, TopicEditor, MAX_GENERATE_COUNT};
