use std::sync::Arc;

use tokio::sync::Mutex;

use crate::academic::AcademicClient;
use crate::models::SemesterDescriptor;
use crate::services::{CourseRequestTable, DuplicationWorkflow, SubmissionOrchestrator};

/// The draft request form bound to the front-end.
#[derive(Debug)]
pub struct FormState {
    pub table: CourseRequestTable,
    pub duplication: DuplicationWorkflow,
    pub submission: SubmissionOrchestrator,
}

impl FormState {
    pub fn new(semester: Option<SemesterDescriptor>) -> Self {
        Self {
            table: CourseRequestTable::new(semester),
            duplication: DuplicationWorkflow::new(),
            submission: SubmissionOrchestrator::new(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub form: Arc<Mutex<FormState>>,
    pub academic: Arc<dyn AcademicClient>,
}

impl AppState {
    pub fn new(form: FormState, academic: Arc<dyn AcademicClient>) -> Self {
        Self {
            form: Arc::new(Mutex::new(form)),
            academic,
        }
    }
}
