use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::academic::dto::CourseRequestResponse;
use crate::error::AppError;
use crate::models::schedule::{Day, Modality, RoomType, SchedulePatch, ScheduleRow, to_minutes_precision};
use crate::models::{CourseRequestPatch, CourseRequestRow, RowState, SemesterDescriptor, calculate_weeks};
use crate::services::schedule_editor::ScheduleEditor;

/// Ordered list of course request rows with index-stable soft deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequestTable {
    rows: Vec<CourseRequestRow>,
    semester: Option<SemesterDescriptor>,
    date_conflicts: BTreeSet<usize>,
}

impl CourseRequestTable {
    /// Table with a single draft row.
    pub fn new(semester: Option<SemesterDescriptor>) -> Self {
        let mut table = Self {
            rows: Vec::new(),
            semester,
            date_conflicts: BTreeSet::new(),
        };
        table.add_row();
        table
    }

    pub fn rows(&self) -> &[CourseRequestRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&CourseRequestRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn semester(&self) -> Option<&SemesterDescriptor> {
        self.semester.as_ref()
    }

    pub fn set_semester(&mut self, semester: SemesterDescriptor) {
        self.semester = Some(semester);
    }

    /// Start/end dates given to new rows.
    pub fn default_dates(&self) -> (NaiveDate, NaiveDate) {
        self.default_dates_on(Local::now().date_naive())
    }

    pub fn default_dates_on(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let semester = self
            .semester
            .clone()
            .unwrap_or_else(|| SemesterDescriptor::fallback_current(today));
        (semester.start_date, semester.end_date)
    }

    pub fn add_row(&mut self) -> usize {
        let (start, end) = self.default_dates();
        self.rows.push(CourseRequestRow::draft(start, end));
        self.rows.len() - 1
    }

    /// Sole row: reset in place. `NEW` row: spliced out. Otherwise soft-deleted.
    pub fn remove_row(&mut self, index: usize) -> Result<(), AppError> {
        if index >= self.rows.len() {
            return Err(AppError::NotFound);
        }

        if self.rows.len() == 1 {
            let (start, end) = self.default_dates();
            self.rows[0] = CourseRequestRow::draft(start, end);
            self.date_conflicts.clear();
            return Ok(());
        }

        match self.rows[index].state {
            RowState::New => {
                self.rows.remove(index);
                self.date_conflicts = self
                    .date_conflicts
                    .iter()
                    .filter(|&&i| i != index)
                    .map(|&i| if i > index { i - 1 } else { i })
                    .collect();
            }
            RowState::Existing | RowState::Deleted => {
                self.rows[index] = CourseRequestRow::tombstone();
                self.date_conflicts.remove(&index);
            }
        }
        Ok(())
    }

    pub fn patch_row(&mut self, index: usize, patch: CourseRequestPatch) -> Result<&CourseRequestRow, AppError> {
        let row = self.editable_row(index)?;
        row.apply(patch);
        Ok(row)
    }

    pub fn add_schedule(&mut self, index: usize) -> Result<usize, AppError> {
        Ok(self.editable_row(index)?.schedules.add())
    }

    pub fn remove_schedule(&mut self, index: usize, schedule: usize) -> Result<(), AppError> {
        let row = self.editable_row(index)?;
        if row.schedules.remove(schedule).is_none() {
            return Err(AppError::NotFound);
        }
        row.schedules.ensure_seeded();
        Ok(())
    }

    /// Out-of-range schedule indices are a logged no-op.
    pub fn patch_schedule(
        &mut self,
        index: usize,
        schedule: usize,
        patch: SchedulePatch,
    ) -> Result<&CourseRequestRow, AppError> {
        let row = self.editable_row(index)?;
        row.schedules.patch(schedule, patch);
        Ok(row)
    }

    /// Records date-range conflicts detected by the view for the given row indices.
    pub fn report_date_conflicts(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.date_conflicts = indices.into_iter().filter(|&i| i < self.rows.len()).collect();
    }

    pub fn date_conflicts(&self) -> &BTreeSet<usize> {
        &self.date_conflicts
    }

    pub fn has_data(&self) -> bool {
        self.rows.iter().any(CourseRequestRow::has_data)
    }

    /// Wholesale replacement of the row list. No merge with the previous rows.
    pub fn replace_all(&mut self, rows: Vec<CourseRequestRow>) {
        info!("Replacing {} row(s) with {}", self.rows.len(), rows.len());
        self.rows = rows;
        self.date_conflicts.clear();
    }

    /// Back to a single draft row.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.date_conflicts.clear();
        self.add_row();
    }

    /// Loads requests already stored for the current semester as `EXISTING` rows.
    pub fn load_existing(&mut self, requests: Vec<CourseRequestResponse>) {
        if requests.is_empty() {
            self.reset();
            return;
        }
        let (start, end) = self.default_dates();
        let rows = requests
            .into_iter()
            .map(|mut request| {
                let stored_dates = (request.start_date.take(), request.end_date.take());
                let mut row = row_from_response(request, start, end);
                if let (Some(s), Some(e)) = stored_dates {
                    row.weeks = calculate_weeks(&s, &e);
                    row.start_date = s;
                    row.end_date = e;
                }
                row.state = RowState::Existing;
                row
            })
            .collect();
        self.replace_all(rows);
    }

    fn editable_row(&mut self, index: usize) -> Result<&mut CourseRequestRow, AppError> {
        let len = self.rows.len();
        match self.rows.get_mut(index) {
            Some(row) if row.state == RowState::Deleted => {
                Err(AppError::BadRequest(format!("row {} has been deleted", index)))
            }
            Some(row) => Ok(row),
            None => {
                warn!("row index {} out of range ({})", index, len);
                Err(AppError::NotFound)
            }
        }
    }
}

/// Maps a stored request onto a fresh `NEW` draft spanning `start..end`.
pub fn row_from_response(request: CourseRequestResponse, start: NaiveDate, end: NaiveDate) -> CourseRequestRow {
    let schedules: Vec<ScheduleRow> = request
        .schedules
        .iter()
        .map(|s| ScheduleRow {
            day: Day::normalize(&s.day),
            start_time: to_minutes_precision(&s.start_time),
            end_time: to_minutes_precision(&s.end_time),
            modality: Modality::from_code(s.modality_id),
            room_type: RoomType::from_code(s.class_room_type_id),
            disability: s.disability,
            total: 0.0,
        })
        .collect();

    let mut row = CourseRequestRow::draft(start, end);
    row.room_type = schedules.iter().find_map(|s| s.room_type);
    row.course_id = request.course_id;
    row.course_name = request.course_name;
    row.section = request.section.unwrap_or_default();
    row.seats = request.capacity;
    row.comments = request.observation.unwrap_or_default();
    row.schedules = ScheduleEditor::from_rows(schedules);
    row.schedules.ensure_seeded();
    row
}
