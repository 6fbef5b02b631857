use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{patch, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{CourseRequestPatch, CourseRequestRow, SchedulePatch, SemesterDescriptor, calculate_weeks};
use crate::services::duplication::SemesterOption;
use crate::services::{ApplyOutcome, Confirmed, DuplicationPreview, SubmissionState, SubmitOutcome};
use crate::state::{AppState, FormState};

#[derive(Deserialize)]
struct WeeksQuery {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
}

#[derive(Serialize)]
struct WeeksResponse {
    weeks: u32,
}

#[derive(Deserialize)]
struct ConflictReport {
    rows: Vec<usize>,
}

#[derive(Deserialize)]
struct SelectionRequest {
    key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyRequest {
    #[serde(default)]
    confirm_replace: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub rows: Vec<CourseRequestRow>,
    pub semester: Option<SemesterDescriptor>,
    pub date_conflicts: Vec<usize>,
    pub has_data: bool,
    pub submission_state: SubmissionState,
    pub last_error: Option<String>,
    pub selected_semester: Option<String>,
    pub preview: Option<DuplicationPreview>,
}

impl From<&FormState> for FormView {
    fn from(form: &FormState) -> Self {
        Self {
            rows: form.table.rows().to_vec(),
            semester: form.table.semester().cloned(),
            date_conflicts: form.table.date_conflicts().iter().copied().collect(),
            has_data: form.table.has_data(),
            submission_state: form.submission.state(),
            last_error: form.submission.last_error().map(str::to_string),
            selected_semester: form.duplication.selected().map(str::to_string),
            preview: form.duplication.preview().cloned(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weeks", get(weeks))
        .route("/form", get(get_form))
        .route("/form/rows", post(add_row))
        .route("/form/rows/{index}", patch(patch_row).delete(remove_row))
        .route("/form/rows/{index}/schedules", post(add_schedule))
        .route(
            "/form/rows/{index}/schedules/{schedule}",
            patch(patch_schedule).delete(remove_schedule),
        )
        .route("/form/conflicts", put(report_conflicts))
        .route("/form/submit", post(submit))
        .route("/duplication/semesters", get(list_semesters))
        .route("/duplication/selection", put(select_semester))
        .route("/duplication/preview", post(preview))
        .route("/duplication/apply", post(apply))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn weeks(Query(params): Query<WeeksQuery>) -> Json<WeeksResponse> {
    Json(WeeksResponse {
        weeks: calculate_weeks(&params.start, &params.end),
    })
}

async fn get_form(State(state): State<AppState>) -> Json<FormView> {
    let form = state.form.lock().await;
    Json(FormView::from(&*form))
}

async fn add_row(State(state): State<AppState>) -> Json<FormView> {
    let mut form = state.form.lock().await;
    form.table.add_row();
    Json(FormView::from(&*form))
}

async fn patch_row(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<CourseRequestPatch>,
) -> Result<Json<FormView>, AppError> {
    let mut form = state.form.lock().await;
    form.table.patch_row(index, req)?;
    Ok(Json(FormView::from(&*form)))
}

async fn remove_row(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<FormView>, AppError> {
    let mut form = state.form.lock().await;
    form.table.remove_row(index)?;
    Ok(Json(FormView::from(&*form)))
}

async fn add_schedule(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<FormView>, AppError> {
    let mut form = state.form.lock().await;
    form.table.add_schedule(index)?;
    Ok(Json(FormView::from(&*form)))
}

async fn patch_schedule(
    State(state): State<AppState>,
    Path((index, schedule)): Path<(usize, usize)>,
    Json(req): Json<SchedulePatch>,
) -> Result<Json<FormView>, AppError> {
    let mut form = state.form.lock().await;
    form.table.patch_schedule(index, schedule, req)?;
    Ok(Json(FormView::from(&*form)))
}

async fn remove_schedule(
    State(state): State<AppState>,
    Path((index, schedule)): Path<(usize, usize)>,
) -> Result<Json<FormView>, AppError> {
    let mut form = state.form.lock().await;
    form.table.remove_schedule(index, schedule)?;
    Ok(Json(FormView::from(&*form)))
}

async fn report_conflicts(
    State(state): State<AppState>,
    Json(req): Json<ConflictReport>,
) -> StatusCode {
    let mut form = state.form.lock().await;
    form.table.report_date_conflicts(req.rows);
    StatusCode::NO_CONTENT
}

async fn submit(State(state): State<AppState>) -> Result<Json<SubmitOutcome>, AppError> {
    let batch = {
        let mut form = state.form.lock().await;
        let FormState { table, submission, .. } = &mut *form;
        let batch = submission.begin(table)?;
        batch
    };

    // other form requests are served while the batch is in flight
    let result = state.academic.submit_academic_request_batch(&batch).await;

    let mut form = state.form.lock().await;
    let outcome = form.submission.finish(&batch, result)?;
    Ok(Json(outcome))
}

async fn list_semesters(State(state): State<AppState>) -> Json<Vec<SemesterOption>> {
    let mut form = state.form.lock().await;
    let today = Local::now().date_naive();
    let options = form
        .duplication
        .load_semesters(state.academic.as_ref(), today)
        .await
        .to_vec();
    Json(options)
}

async fn select_semester(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> StatusCode {
    let mut form = state.form.lock().await;
    form.duplication.select(req.key);
    StatusCode::NO_CONTENT
}

async fn preview(State(state): State<AppState>) -> Result<Json<DuplicationPreview>, AppError> {
    // the lock is released while the fetch is in flight
    let ticket = state.form.lock().await.duplication.begin_preview()?;

    let requests = state
        .academic
        .get_academic_requests_by_semester(ticket.semester_id)
        .await?;

    let mut form = state.form.lock().await;
    form.duplication
        .complete_preview(ticket, requests)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::Conflict("The selection changed while the preview was loading".to_string()))
}

async fn apply(
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<ApplyOutcome>, AppError> {
    let ticket = {
        let mut form = state.form.lock().await;
        let FormState { table, duplication, .. } = &mut *form;
        let ticket = duplication
            .begin_apply(table, &Confirmed(req.confirm_replace))
            .await?;
        ticket
    };
    let Some(mut ticket) = ticket else {
        return Err(AppError::Conflict(
            "The form already has data; confirm the replacement to duplicate".to_string(),
        ));
    };

    let rows = ticket.load_rows(state.academic.as_ref()).await?;

    let mut form = state.form.lock().await;
    let FormState { table, duplication, .. } = &mut *form;
    let outcome = duplication.complete_apply(ticket, rows, table)?;
    Ok(Json(outcome))
}
