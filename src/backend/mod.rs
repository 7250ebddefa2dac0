pub mod http;
pub mod memory;

use crate::catalog::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Errors crossing the evaluation-service boundary. The taxonomy is flat on
/// purpose: callers surface the code and message, nothing retries.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Invalid(String),
    #[error("backend request failed: {0}")]
    Http(String),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("sample store error: {0}")]
    Store(String),
}

impl BackendError {
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::NotFound(_) => "not_found",
            BackendError::Invalid(_) => "bad_params",
            BackendError::Http(_) => "http_failed",
            BackendError::Rejected(_) => "backend_rejected",
            BackendError::Store(_) => "store_failed",
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::Store(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRow {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRow {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRow {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuestion {
    pub id: i64,
    pub text: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTopic {
    pub id: i64,
    pub name: String,
    pub questions: Vec<TemplateQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetail {
    pub id: i64,
    pub name: String,
    pub topics: Vec<TemplateTopic>,
}

impl TemplateDetail {
    pub fn question_count(&self) -> usize {
        self.topics.iter().map(|t| t.questions.len()).sum()
    }

    pub fn has_question(&self, question_id: i64) -> bool {
        self.topics
            .iter()
            .any(|t| t.questions.iter().any(|q| q.id == question_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    pub id: i64,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSetRow {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicWeight {
    pub topic_id: i64,
    pub topic_name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSetDetail {
    pub id: i64,
    pub name: String,
    pub topic_weights: Vec<TopicWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleAssignment {
    pub title: String,
    pub weight_set_id: i64,
    pub weight_set_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonScoreRow {
    pub person_id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerScore {
    pub question_id: i64,
    pub score: i64,
}

/// One submission: every answered question for a (period, template,
/// evaluatee) triple. `evaluator_id: None` is an anonymous submission and
/// serializes as JSON null on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBatch {
    pub period_id: i64,
    pub template_id: i64,
    pub evaluator_id: Option<String>,
    pub evaluatee_id: String,
    pub answers: Vec<AnswerScore>,
}

/// The evaluation service seen from the daemon: one method per endpoint
/// family of the REST surface. Implementations: `MemoryBackend` (seeded
/// sample store) and `HttpBackend` (the real service).
pub trait Backend {
    fn mode(&self) -> &'static str;

    fn list_people(&self) -> Result<Vec<PersonRow>, BackendError>;
    fn list_titles(&self) -> Result<Vec<String>, BackendError>;

    fn list_categories(&self) -> Result<Vec<CategoryRow>, BackendError>;
    fn create_category(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CategoryRow, BackendError>;
    fn delete_category(&mut self, id: i64) -> Result<(), BackendError>;

    fn list_topics(&self) -> Result<Vec<TopicRow>, BackendError>;
    fn create_topic(
        &mut self,
        name: &str,
        description: Option<&str>,
        category_id: i64,
    ) -> Result<TopicRow, BackendError>;
    fn delete_topic(&mut self, id: i64) -> Result<(), BackendError>;

    fn create_question(&mut self, text: &str, weight: f64, topic_id: i64)
        -> Result<(), BackendError>;

    fn list_templates(&self) -> Result<Vec<TemplateRow>, BackendError>;
    fn create_template(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<TemplateRow, BackendError>;
    fn template_detail(&self, id: i64) -> Result<TemplateDetail, BackendError>;
    fn attach_topic(&mut self, template_id: i64, topic_id: i64) -> Result<(), BackendError>;
    fn detach_topic(&mut self, template_id: i64, topic_id: i64) -> Result<(), BackendError>;

    fn list_periods(&self) -> Result<Vec<PeriodRow>, BackendError>;
    fn create_period(
        &mut self,
        name: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<PeriodRow, BackendError>;
    fn update_period(
        &mut self,
        id: i64,
        name: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<PeriodRow, BackendError>;
    fn delete_period(&mut self, id: i64) -> Result<(), BackendError>;

    fn list_weight_sets(&self) -> Result<Vec<WeightSetRow>, BackendError>;
    fn create_weight_set(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<WeightSetRow, BackendError>;
    fn delete_weight_set(&mut self, id: i64) -> Result<(), BackendError>;
    fn weight_set_detail(&self, id: i64) -> Result<WeightSetDetail, BackendError>;
    fn set_topic_weight(
        &mut self,
        set_id: i64,
        topic_id: i64,
        weight: f64,
    ) -> Result<(), BackendError>;

    fn list_title_assignments(&self) -> Result<Vec<TitleAssignment>, BackendError>;
    fn assign_title(&mut self, title: &str, set_id: i64) -> Result<(), BackendError>;
    fn remove_title_assignment(&mut self, title: &str) -> Result<(), BackendError>;

    fn overall_scores(
        &self,
        period_id: i64,
        template_id: i64,
    ) -> Result<Vec<PersonScoreRow>, BackendError>;
    fn person_score(
        &self,
        person_id: &str,
        period_id: i64,
        template_id: i64,
    ) -> Result<f64, BackendError>;

    fn submit_answers(&mut self, batch: &AnswerBatch) -> Result<(), BackendError>;
}
