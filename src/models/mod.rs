pub mod course_request;
pub mod schedule;
pub mod semester;

pub use course_request::{CourseRequestPatch, CourseRequestRow, RowState, calculate_weeks};
pub use schedule::{Day, Modality, RoomType, SchedulePatch, ScheduleRow, duration_hours};
pub use semester::SemesterDescriptor;
