use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::academic::AcademicClient;
use crate::academic::dto::CourseRequestResponse;
use crate::error::AppError;
use crate::models::{CourseRequestRow, SemesterDescriptor};
use crate::services::table::{CourseRequestTable, row_from_response};

/// Asked before a duplication wipes rows the user has already filled in.
#[async_trait]
pub trait ReplaceConfirmation: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Answer collected up front, e.g. from a request flag.
pub struct Confirmed(pub bool);

#[async_trait]
impl ReplaceConfirmation for Confirmed {
    async fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterOption {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicationPreview {
    pub total_requests: usize,
    pub semester_id: i64,
    pub key: String,
    pub message: String,
    pub requests: Vec<CourseRequestResponse>,
}

/// Handle for a preview fetch in flight. Only the newest ticket may land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    pub generation: u64,
    pub semester_id: i64,
    pub key: String,
}

/// Duplication confirmed by the user, waiting for its rows to be loaded.
#[derive(Debug)]
pub struct ApplyTicket {
    pub generation: u64,
    pub semester_id: i64,
    pub key: String,
    cached: Option<Vec<CourseRequestResponse>>,
    start: NaiveDate,
    end: NaiveDate,
}

impl ApplyTicket {
    /// Maps the source requests into drafts, reusing the preview when one was fetched.
    pub async fn load_rows(&mut self, client: &dyn AcademicClient) -> Result<Vec<CourseRequestRow>, AppError> {
        let requests = match self.cached.take() {
            Some(requests) => requests,
            None => client.get_academic_requests_by_semester(self.semester_id).await?,
        };

        let mut rows = Vec::with_capacity(requests.len());
        for request in requests {
            let request = backfill(client, request).await;
            rows.push(row_from_response(request, self.start, self.end));
        }
        Ok(rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied { count: usize, message: String },
    Empty { message: String },
    Cancelled,
}

#[derive(Debug, Default)]
pub struct DuplicationWorkflow {
    options: Vec<SemesterOption>,
    semester_ids: HashMap<String, i64>,
    selected: Option<String>,
    preview: Option<DuplicationPreview>,
    generation: u64,
}

impl DuplicationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &[SemesterOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn preview(&self) -> Option<&DuplicationPreview> {
        self.preview.as_ref()
    }

    pub fn semester_id(&self, key: &str) -> Option<i64> {
        self.semester_ids.get(key).copied()
    }

    /// Fills the selectable list with every semester but the current one.
    /// A failed fetch degrades to a single synthesized previous semester.
    pub async fn load_semesters(
        &mut self,
        client: &dyn AcademicClient,
        today: NaiveDate,
    ) -> &[SemesterOption] {
        let semesters = match client.get_all_semesters_except_current().await {
            Ok(semesters) => semesters,
            Err(e) => {
                warn!("Failed to load semesters, using fallback: {}", e);
                vec![SemesterDescriptor::fallback_previous(today)]
            }
        };

        self.options.clear();
        self.semester_ids.clear();
        for semester in semesters {
            let key = semester.key();
            self.options.push(SemesterOption {
                label: format!("Semester {} of {}", semester.period, semester.year),
                key: key.clone(),
            });
            self.semester_ids.insert(key, semester.id);
        }

        info!("Loaded {} semester option(s) for duplication", self.options.len());
        &self.options
    }

    /// Changing the selection throws away any preview, including one still in flight.
    pub fn select(&mut self, key: Option<String>) {
        self.selected = key.filter(|k| !k.trim().is_empty());
        self.preview = None;
        self.generation += 1;
    }

    pub fn begin_preview(&mut self) -> Result<PreviewTicket, AppError> {
        let (key, semester_id) = self.selected_semester()?;
        self.preview = None;
        self.generation += 1;
        Ok(PreviewTicket {
            generation: self.generation,
            semester_id,
            key,
        })
    }

    /// Stores the fetched preview unless a newer selection or preview superseded `ticket`.
    pub fn complete_preview(
        &mut self,
        ticket: PreviewTicket,
        requests: Vec<CourseRequestResponse>,
    ) -> Option<&DuplicationPreview> {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale preview for {} (generation {} != {})",
                ticket.key, ticket.generation, self.generation
            );
            return None;
        }

        let message = found_message(requests.len(), &ticket.key);
        self.preview = Some(DuplicationPreview {
            total_requests: requests.len(),
            semester_id: ticket.semester_id,
            key: ticket.key,
            message,
            requests,
        });
        self.preview.as_ref()
    }

    pub async fn load_preview(&mut self, client: &dyn AcademicClient) -> Result<DuplicationPreview, AppError> {
        let ticket = self.begin_preview()?;
        let requests = client
            .get_academic_requests_by_semester(ticket.semester_id)
            .await?;
        self.complete_preview(ticket, requests)
            .cloned()
            .ok_or_else(|| AppError::Conflict("preview was superseded".to_string()))
    }

    /// Replaces the whole table with drafts copied from the selected semester.
    pub async fn apply(
        &mut self,
        client: &dyn AcademicClient,
        table: &mut CourseRequestTable,
        confirmation: &dyn ReplaceConfirmation,
    ) -> Result<ApplyOutcome, AppError> {
        let Some(mut ticket) = self.begin_apply(table, confirmation).await? else {
            return Ok(ApplyOutcome::Cancelled);
        };
        let rows = ticket.load_rows(client).await?;
        self.complete_apply(ticket, rows, table)
    }

    /// Confirms the replacement and claims any matching preview.
    /// `None` means the user declined and nothing changed.
    pub async fn begin_apply(
        &mut self,
        table: &CourseRequestTable,
        confirmation: &dyn ReplaceConfirmation,
    ) -> Result<Option<ApplyTicket>, AppError> {
        let (key, semester_id) = self.selected_semester()?;

        if table.has_data() {
            let question = format!(
                "Duplicating {} will replace the {} request(s) currently in the form. Continue?",
                key,
                table.rows().iter().filter(|r| r.has_data()).count()
            );
            if !confirmation.confirm(&question).await {
                info!("Duplication of {} cancelled by user", key);
                return Ok(None);
            }
        }

        let cached = match self.preview.take() {
            Some(preview) if preview.semester_id == semester_id => Some(preview.requests),
            _ => None,
        };
        let (start, end) = table.default_dates();
        self.generation += 1;

        Ok(Some(ApplyTicket {
            generation: self.generation,
            semester_id,
            key,
            cached,
            start,
            end,
        }))
    }

    /// Commits rows loaded for `ticket`, unless the selection moved on in the meantime.
    pub fn complete_apply(
        &mut self,
        ticket: ApplyTicket,
        rows: Vec<CourseRequestRow>,
        table: &mut CourseRequestTable,
    ) -> Result<ApplyOutcome, AppError> {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale duplication of {} (generation {} != {})",
                ticket.key, ticket.generation, self.generation
            );
            return Err(AppError::Conflict(
                "The selection changed while the duplication was loading".to_string(),
            ));
        }

        let count = rows.len();
        table.replace_all(rows);
        self.generation += 1;

        let message = found_message(count, &ticket.key);
        info!("Duplication of {}: {}", ticket.key, message);
        if count == 0 {
            Ok(ApplyOutcome::Empty { message })
        } else {
            Ok(ApplyOutcome::Applied { count, message })
        }
    }

    fn selected_semester(&self) -> Result<(String, i64), AppError> {
        let key = self
            .selected
            .clone()
            .ok_or_else(|| AppError::Lookup("Select a semester to duplicate".to_string()))?;
        let semester_id = self
            .semester_id(&key)
            .ok_or_else(|| AppError::Lookup(format!("Unknown semester {}", key)))?;
        Ok((key, semester_id))
    }
}

fn found_message(count: usize, key: &str) -> String {
    if count == 0 {
        format!("No requests found for {}", key)
    } else {
        format!("Found {} request(s) for {}", count, key)
    }
}

/// Fills in the course name and section from the catalogue when the stored request lacks them.
async fn backfill(client: &dyn AcademicClient, mut request: CourseRequestResponse) -> CourseRequestResponse {
    if !request.course_name.trim().is_empty() && request.section.is_some() {
        return request;
    }

    match client.lookup_course_by_id(&request.course_id).await {
        Ok(Some(course)) => {
            if request.course_name.trim().is_empty() {
                request.course_name = course.name;
            }
            if request.section.is_none() {
                request.section = course.section_id;
            }
        }
        Ok(None) => warn!("Course {} not found in catalogue", request.course_id),
        Err(e) => warn!("Course lookup for {} failed: {}", request.course_id, e),
    }
    request
}

