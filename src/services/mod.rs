pub mod duplication;
pub mod schedule_editor;
pub mod submission;
pub mod table;

pub use duplication::{ApplyOutcome, ApplyTicket, Confirmed, DuplicationPreview, DuplicationWorkflow, ReplaceConfirmation};
pub use schedule_editor::ScheduleEditor;
pub use submission::{SubmissionOrchestrator, SubmissionState, SubmitOutcome};
pub use table::CourseRequestTable;
