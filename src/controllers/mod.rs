pub mod board;
pub mod detail;
pub mod submission;

pub use board::IssueBoard;
pub use detail::{DetailState, EditBuffer, IssueDetailController, LoadOutcome, LoadTicket, SaveOutcome, SaveTicket};
pub use submission::{
    FixedLocation, IssueSubmissionController, LocationProvider, PermissionStatus, Photo, SubmissionDraft,
    SubmissionReceipt,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag shared between a view and the work it starts.
/// Once cancelled, late results are dropped instead of applied.
#[derive(Debug, Clone, Default)]
pub struct ViewToken {
    cancelled: Arc<AtomicBool>,
}

impl ViewToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
