//! Local, per-machine storage.

mod local;

pub use local::{
    group_recent, CreatedQuiz, FinalResult, LocalError, LocalStore, ParticipantRole, RecentGroup,
    RecentResult, SavedState,
};
