#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};

use academic_requests::academic::AcademicClient;
use academic_requests::academic::dto::{
    AcademicRequestBatch, CourseLookup, CourseRequestResponse, ScheduleResponse,
};
use academic_requests::error::AppError;
use academic_requests::models::SemesterDescriptor;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Scripted collaborator: canned semesters, requests and catalogue entries.
#[derive(Default)]
pub struct StubAcademicClient {
    pub semesters: Option<Vec<SemesterDescriptor>>,
    pub requests: HashMap<i64, Vec<CourseRequestResponse>>,
    pub catalogue: HashMap<String, CourseLookup>,
    pub fail_submit: bool,
    pub submit_delay: Option<Duration>,
    pub request_fetches: AtomicUsize,
    pub submitted: Mutex<Vec<AcademicRequestBatch>>,
}

impl StubAcademicClient {
    pub fn fetches(&self) -> usize {
        self.request_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AcademicClient for StubAcademicClient {
    async fn get_all_semesters(&self) -> Result<Vec<SemesterDescriptor>, AppError> {
        self.semesters
            .clone()
            .ok_or_else(|| AppError::Backend("semesters unavailable".to_string()))
    }

    async fn get_current_semester(&self) -> Result<SemesterDescriptor, AppError> {
        self.semesters
            .iter()
            .flatten()
            .find(|s| s.is_current)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn get_academic_requests_by_semester(
        &self,
        semester_id: i64,
    ) -> Result<Vec<CourseRequestResponse>, AppError> {
        self.request_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.requests.get(&semester_id).cloned().unwrap_or_default())
    }

    async fn submit_academic_request_batch(&self, batch: &AcademicRequestBatch) -> Result<(), AppError> {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_submit {
            return Err(AppError::Backend("503 Service Unavailable".to_string()));
        }
        self.submitted.lock().unwrap().push(batch.clone());
        Ok(())
    }

    async fn lookup_course_by_id(&self, course_id: &str) -> Result<Option<CourseLookup>, AppError> {
        Ok(self.catalogue.get(course_id).cloned())
    }
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn semester(id: i64, year: i32, period: u8, start: &str, end: &str, is_current: bool) -> SemesterDescriptor {
    SemesterDescriptor {
        id,
        year,
        period,
        start_date: date(start),
        end_date: date(end),
        is_current,
    }
}

pub fn current_semester() -> SemesterDescriptor {
    semester(20242, 2024, 2, "2024-08-05", "2024-11-29", true)
}

pub fn past_semester() -> SemesterDescriptor {
    semester(20241, 2024, 1, "2024-01-08", "2024-05-31", false)
}

pub fn schedule(day: &str, start: &str, end: &str, modality: i64, room: i64) -> ScheduleResponse {
    ScheduleResponse {
        day: day.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        modality_id: modality,
        class_room_type_id: room,
        disability: false,
    }
}

pub fn stored_request(course_id: &str, name: &str, schedules: Vec<ScheduleResponse>) -> CourseRequestResponse {
    CourseRequestResponse {
        course_id: course_id.to_string(),
        course_name: name.to_string(),
        section: Some("CS".to_string()),
        capacity: 25,
        observation: None,
        start_date: Some("2024-01-08".to_string()),
        end_date: Some("2024-05-31".to_string()),
        schedules,
    }
}
