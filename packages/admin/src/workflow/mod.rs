//! Save, edit and delete workflows for asset-backed records, plus the
//! smaller flows for chapters and grading.

mod checkpoint;
mod confirm;
mod grading;
mod guard;
mod record;
mod save;
mod upload;

pub use checkpoint::sync_badge_checkpoint;
pub use confirm::{AlwaysConfirm, Confirm, NeverConfirm};
pub use grading::{grade_submission, submissions_for};
pub use guard::{InFlight, InFlightGuard};
pub use record::{create_record, delete_record, update_record};
pub use save::{DeleteOutcome, SaveOrchestrator};
pub use upload::Upload;
