use serde::Serialize;
use tracing::{error, info, warn};

use crate::academic::AcademicClient;
use crate::academic::dto::{AcademicRequestBatch, AcademicRequestPayload, SchedulePayload};
use crate::error::AppError;
use crate::models::schedule::with_seconds;
use crate::models::{CourseRequestRow, RowState};
use crate::services::table::CourseRequestTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub submitted: usize,
}

#[derive(Debug, Default)]
pub struct SubmissionOrchestrator {
    state: SubmissionState,
    last_error: Option<String>,
}

impl SubmissionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Validates, converts and sends the whole table as one batch.
    /// Every exit path returns to `Idle`; failures are kept in `last_error`.
    pub async fn submit(
        &mut self,
        table: &CourseRequestTable,
        client: &dyn AcademicClient,
    ) -> Result<SubmitOutcome, AppError> {
        let batch = self.begin(table)?;
        let result = client.submit_academic_request_batch(&batch).await;
        self.finish(&batch, result)
    }

    /// Validates the table and builds the batch, leaving the orchestrator in `Sending`.
    /// The caller sends the batch and reports back through `finish`.
    pub fn begin(&mut self, table: &CourseRequestTable) -> Result<AcademicRequestBatch, AppError> {
        if self.state == SubmissionState::Sending {
            return Err(AppError::Conflict("A submission is already in progress".to_string()));
        }

        self.state = SubmissionState::Validating;
        self.last_error = None;

        let rows = match validate_all_fields(table) {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(e)),
        };
        let batch = to_batch(&rows);

        self.state = SubmissionState::Sending;
        info!("Submitting {} course request(s)", batch.requests.len());
        Ok(batch)
    }

    pub fn finish(
        &mut self,
        batch: &AcademicRequestBatch,
        result: Result<(), AppError>,
    ) -> Result<SubmitOutcome, AppError> {
        match result {
            Ok(()) => {
                self.state = SubmissionState::Idle;
                Ok(SubmitOutcome {
                    submitted: batch.requests.len(),
                })
            }
            Err(e) => {
                error!("Course request batch failed: {}", e);
                Err(self.fail(e))
            }
        }
    }

    fn fail(&mut self, e: AppError) -> AppError {
        self.state = SubmissionState::Idle;
        self.last_error = Some(e.user_message());
        e
    }
}

/// Rows that will be submitted: everything not soft-deleted, each passing field validation,
/// with no date conflict reported by the view.
pub fn validate_all_fields(table: &CourseRequestTable) -> Result<Vec<&CourseRequestRow>, AppError> {
    let rows: Vec<(usize, &CourseRequestRow)> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.state != RowState::Deleted)
        .collect();

    if rows.is_empty() {
        return Err(AppError::Validation("Add at least one course request".to_string()));
    }

    for (index, row) in &rows {
        row.validate()
            .map_err(|msg| AppError::Validation(format!("Row {}: {}", index + 1, msg)))?;
    }

    if let Some(index) = rows.iter().map(|(i, _)| *i).find(|i| table.date_conflicts().contains(i)) {
        warn!("Submission blocked by date conflict on row {}", index + 1);
        return Err(AppError::Validation(format!(
            "Row {}: dates conflict with another request",
            index + 1
        )));
    }

    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

pub fn to_batch(rows: &[&CourseRequestRow]) -> AcademicRequestBatch {
    AcademicRequestBatch {
        requests: rows.iter().map(|row| to_payload(row)).collect(),
    }
}

fn to_payload(row: &CourseRequestRow) -> AcademicRequestPayload {
    let observation = Some(row.comments.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    AcademicRequestPayload {
        course_id: row.course_id.trim().to_string(),
        capacity: row.seats,
        start_date: row.start_date.trim().to_string(),
        end_date: row.end_date.trim().to_string(),
        observation,
        schedules: row
            .schedules()
            .iter()
            .map(|s| SchedulePayload {
                day: s.day.map(|d| d.backend_name().to_string()).unwrap_or_default(),
                start_time: with_seconds(&s.start_time),
                end_time: with_seconds(&s.end_time),
                modality_id: s.modality.map(|m| m.code()).unwrap_or_default(),
                class_room_type_id: s.room_type.map(|r| r.code()).unwrap_or_default(),
                disability: s.disability,
            })
            .collect(),
    }
}
