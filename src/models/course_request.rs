use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::schedule::{RoomType, ScheduleRow};
use crate::services::schedule_editor::ScheduleEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowState {
    #[default]
    New,
    Existing,
    Deleted,
}

/// One planned course offering as bound to the request form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequestRow {
    pub course_id: String,
    pub course_name: String,
    pub section: String,
    pub room_type: Option<RoomType>,
    pub seats: u32,
    pub start_date: String,
    pub end_date: String,
    pub weeks: u32,
    pub comments: String,
    pub schedules: ScheduleEditor,
    pub state: RowState,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequestPatch {
    pub course_id: Option<String>,
    pub course_name: Option<String>,
    pub section: Option<String>,
    pub room_type: Option<RoomType>,
    pub seats: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub comments: Option<String>,
}

impl CourseRequestRow {
    /// Fresh draft spanning the given dates with one empty schedule slot.
    pub fn draft(start: NaiveDate, end: NaiveDate) -> CourseRequestRow {
        let start_date = start.format("%Y-%m-%d").to_string();
        let end_date = end.format("%Y-%m-%d").to_string();
        CourseRequestRow {
            weeks: calculate_weeks(&start_date, &end_date),
            start_date,
            end_date,
            schedules: ScheduleEditor::seeded(),
            state: RowState::New,
            ..Default::default()
        }
    }

    /// Soft-deleted placeholder: no field data, only the state tag.
    pub fn tombstone() -> CourseRequestRow {
        CourseRequestRow {
            state: RowState::Deleted,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, patch: CourseRequestPatch) {
        if let Some(course_id) = patch.course_id {
            self.course_id = course_id;
        }
        if let Some(course_name) = patch.course_name {
            self.course_name = course_name;
        }
        if let Some(section) = patch.section {
            self.section = section;
        }
        if let Some(room_type) = patch.room_type {
            self.room_type = Some(room_type);
        }
        if let Some(seats) = patch.seats {
            self.seats = seats;
        }
        if let Some(comments) = patch.comments {
            self.comments = comments;
        }

        let dates_changed = patch.start_date.is_some() || patch.end_date.is_some();
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if dates_changed {
            self.weeks = calculate_weeks(&self.start_date, &self.end_date);
        }
    }

    /// True when the user has typed anything worth protecting from a wholesale replace.
    pub fn has_data(&self) -> bool {
        if self.state == RowState::Deleted {
            return false;
        }
        !self.course_id.trim().is_empty()
            || !self.course_name.trim().is_empty()
            || !self.section.trim().is_empty()
            || self.seats > 0
            || !self.comments.trim().is_empty()
            || self.schedules.iter().any(|s| !s.is_empty())
    }

    /// Checks the field constraints required before submission.
    pub fn validate(&self) -> Result<(), String> {
        if self.course_id.trim().is_empty() {
            return Err("course is required".to_string());
        }
        if self.course_name.trim().is_empty() {
            return Err(format!("course {} has no name", self.course_id));
        }
        if self.section.trim().is_empty() {
            return Err(format!("course {} has no section", self.course_id));
        }

        let start = parse_date(&self.start_date)
            .ok_or_else(|| format!("course {} needs a valid start date", self.course_id))?;
        let end = parse_date(&self.end_date)
            .ok_or_else(|| format!("course {} needs a valid end date", self.course_id))?;
        if end < start {
            return Err(format!(
                "course {} ends before it starts ({} < {})",
                self.course_id, self.end_date, self.start_date
            ));
        }

        if self.seats == 0 {
            return Err(format!("course {} needs at least one seat", self.course_id));
        }

        if self.schedules.is_empty() {
            return Err(format!("course {} has no schedule", self.course_id));
        }
        if let Some(position) = self.schedules.iter().position(|s| !s.is_complete()) {
            return Err(format!(
                "schedule {} of course {} is incomplete",
                position + 1,
                self.course_id
            ));
        }

        Ok(())
    }

    pub fn schedules(&self) -> &[ScheduleRow] {
        self.schedules.rows()
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Whole weeks covered by a naive calendar date range, rounded up.
/// Missing, unparsable or inverted ranges give zero.
pub fn calculate_weeks(start: &str, end: &str) -> u32 {
    let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
        return 0;
    };
    if end < start {
        return 0;
    }
    let days = (end - start).num_days();
    ((days + 6) / 7) as u32
}
