pub mod dto;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::SemesterDescriptor;

use dto::{AcademicRequestBatch, CourseLookup, CourseRequestResponse};

/// REST collaborator that owns semesters, saved course requests and the course catalogue.
#[async_trait]
pub trait AcademicClient: Send + Sync {
    async fn get_all_semesters(&self) -> Result<Vec<SemesterDescriptor>, AppError>;
    async fn get_current_semester(&self) -> Result<SemesterDescriptor, AppError>;
    async fn get_academic_requests_by_semester(
        &self,
        semester_id: i64,
    ) -> Result<Vec<CourseRequestResponse>, AppError>;
    async fn submit_academic_request_batch(&self, batch: &AcademicRequestBatch) -> Result<(), AppError>;
    async fn lookup_course_by_id(&self, course_id: &str) -> Result<Option<CourseLookup>, AppError>;

    async fn get_all_semesters_except_current(&self) -> Result<Vec<SemesterDescriptor>, AppError> {
        let semesters = self.get_all_semesters().await?;
        Ok(semesters.into_iter().filter(|s| !s.is_current).collect())
    }
}

pub struct HttpAcademicClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpAcademicClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let base_url = config
            .api_url
            .clone()
            .ok_or_else(|| AppError::Config("ACADEMIC_API_URL is not set".to_string()))?;
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.authorized(self.client.get(self.url(path))).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!("GET {} returned {}: {}", path, status, body)));
        }

        let body_text = response.text().await?;
        serde_json::from_str::<T>(&body_text).map_err(|e| {
            tracing::error!("Failed to parse response of GET {}: {}", path, e);
            AppError::Backend(format!("Failed to parse response of GET {}: {}", path, e))
        })
    }
}

#[async_trait]
impl AcademicClient for HttpAcademicClient {
    async fn get_all_semesters(&self) -> Result<Vec<SemesterDescriptor>, AppError> {
        self.get_json("semesters").await
    }

    async fn get_current_semester(&self) -> Result<SemesterDescriptor, AppError> {
        self.get_json("semesters/current").await
    }

    async fn get_academic_requests_by_semester(
        &self,
        semester_id: i64,
    ) -> Result<Vec<CourseRequestResponse>, AppError> {
        self.get_json(&format!("academic-requests/semester/{}", semester_id))
            .await
    }

    async fn submit_academic_request_batch(&self, batch: &AcademicRequestBatch) -> Result<(), AppError> {
        let response = self
            .authorized(self.client.post(self.url("academic-requests/batch")))
            .json(batch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!("Failed to submit request batch: {} {}", status, body)));
        }

        tracing::info!("Submitted {} course request(s): {}", batch.requests.len(), status);
        Ok(())
    }

    async fn lookup_course_by_id(&self, course_id: &str) -> Result<Option<CourseLookup>, AppError> {
        let path = format!("courses/{}", course_id);
        let response = self.authorized(self.client.get(self.url(&path))).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!("GET {} returned {}: {}", path, status, body)));
        }

        let body_text = response.text().await?;
        serde_json::from_str::<Option<CourseLookup>>(&body_text)
            .map_err(|e| AppError::Backend(format!("Failed to parse course {}: {}", course_id, e)))
    }
}

/// Offline collaborator: knows no semesters or requests and accepts every batch.
pub struct NoopAcademicClient;

#[async_trait]
impl AcademicClient for NoopAcademicClient {
    async fn get_all_semesters(&self) -> Result<Vec<SemesterDescriptor>, AppError> {
        Ok(Vec::new())
    }

    async fn get_current_semester(&self) -> Result<SemesterDescriptor, AppError> {
        Err(AppError::NotFound)
    }

    async fn get_academic_requests_by_semester(
        &self,
        _semester_id: i64,
    ) -> Result<Vec<CourseRequestResponse>, AppError> {
        Ok(Vec::new())
    }

    async fn submit_academic_request_batch(&self, _batch: &AcademicRequestBatch) -> Result<(), AppError> {
        Ok(())
    }

    async fn lookup_course_by_id(&self, _course_id: &str) -> Result<Option<CourseLookup>, AppError> {
        Ok(None)
    }
}
