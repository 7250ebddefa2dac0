use serde::Serialize;
use std::collections::BTreeMap;

use crate::backend::{AnswerBatch, AnswerScore, TemplateDetail};

/// Who is filling the survey in. Anonymous submissions reach the backend
/// with a null evaluator id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EvaluatorChoice {
    #[default]
    Unset,
    Anonymous,
    Person(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub period_id: Option<i64>,
    pub template_id: Option<i64>,
    pub evaluatee_id: Option<String>,
    pub evaluator: Option<String>,
    pub anonymous: bool,
    pub load_seq: u64,
    pub template_loaded: bool,
    pub answered: usize,
    pub total: usize,
}

/// State the survey pages used to keep in component state: the current
/// selections, the loaded template, and the answer map.
///
/// Template loads are guarded by a sequence number: selecting a template
/// invalidates every load issued before it, so a slow response for a
/// previous selection can never overwrite the current form ("latest request
/// wins").
#[derive(Debug, Default)]
pub struct SurveyForm {
    period_id: Option<i64>,
    template_id: Option<i64>,
    evaluatee_id: Option<String>,
    evaluator: EvaluatorChoice,
    load_seq: u64,
    detail: Option<TemplateDetail>,
    answers: BTreeMap<i64, i64>,
}

impl SurveyForm {
    pub fn set_period(&mut self, period_id: Option<i64>) {
        self.period_id = period_id;
    }

    pub fn set_evaluatee(&mut self, evaluatee_id: Option<String>) {
        self.evaluatee_id = evaluatee_id;
    }

    pub fn set_evaluator(&mut self, evaluator: EvaluatorChoice) {
        self.evaluator = evaluator;
    }

    /// Selects a template and returns the sequence number a subsequent load
    /// must present. Clears the previous detail and all answers.
    pub fn select_template(&mut self, template_id: i64) -> u64 {
        self.template_id = Some(template_id);
        self.load_seq += 1;
        self.detail = None;
        self.answers.clear();
        self.load_seq
    }

    pub fn selected_template(&self) -> Option<i64> {
        self.template_id
    }

    pub fn current_seq(&self) -> u64 {
        self.load_seq
    }

    /// Applies a loaded template detail. Returns false (and discards the
    /// payload) when the sequence is stale or the detail belongs to a
    /// template that is no longer selected.
    pub fn apply_template_detail(&mut self, seq: u64, detail: TemplateDetail) -> bool {
        if seq != self.load_seq || Some(detail.id) != self.template_id {
            return false;
        }
        self.detail = Some(detail);
        true
    }

    pub fn template_detail(&self) -> Option<&TemplateDetail> {
        self.detail.as_ref()
    }

    pub fn set_score(&mut self, question_id: i64, score: i64) -> Result<(), String> {
        let Some(detail) = &self.detail else {
            return Err("load a template before scoring".to_string());
        };
        if !detail.has_question(question_id) {
            return Err(format!("question {} is not in the loaded template", question_id));
        }
        if !(1..=4).contains(&score) {
            return Err("score must be between 1 and 4".to_string());
        }
        self.answers.insert(question_id, score);
        Ok(())
    }

    pub fn clear_score(&mut self, question_id: i64) {
        self.answers.remove(&question_id);
    }

    /// (answered, total questions in the loaded template).
    pub fn completeness(&self) -> (usize, usize) {
        let total = self
            .detail
            .as_ref()
            .map(|d| d.question_count())
            .unwrap_or(0);
        (self.answers.len(), total)
    }

    pub fn is_complete(&self) -> bool {
        let (answered, total) = self.completeness();
        total > 0 && answered == total
    }

    pub fn status(&self) -> FormStatus {
        let (answered, total) = self.completeness();
        let (evaluator, anonymous) = match &self.evaluator {
            EvaluatorChoice::Unset => (None, false),
            EvaluatorChoice::Anonymous => (None, true),
            EvaluatorChoice::Person(id) => (Some(id.clone()), false),
        };
        FormStatus {
            period_id: self.period_id,
            template_id: self.template_id,
            evaluatee_id: self.evaluatee_id.clone(),
            evaluator,
            anonymous,
            load_seq: self.load_seq,
            template_loaded: self.detail.is_some(),
            answered,
            total,
        }
    }

    /// Builds the submission payload. Required: period, loaded template,
    /// evaluatee, and an explicit evaluator choice (a person or anonymous).
    pub fn build_batch(&self) -> Result<AnswerBatch, String> {
        let Some(period_id) = self.period_id else {
            return Err("period is required".to_string());
        };
        let Some(template_id) = self.template_id else {
            return Err("template is required".to_string());
        };
        if self.detail.is_none() {
            return Err("template detail is not loaded".to_string());
        }
        let Some(evaluatee_id) = self.evaluatee_id.clone() else {
            return Err("evaluatee is required".to_string());
        };
        let evaluator_id = match &self.evaluator {
            EvaluatorChoice::Unset => {
                return Err("choose an evaluator or mark the submission anonymous".to_string())
            }
            EvaluatorChoice::Anonymous => None,
            EvaluatorChoice::Person(id) => Some(id.clone()),
        };
        if self.answers.is_empty() {
            return Err("no answers to submit".to_string());
        }
        Ok(AnswerBatch {
            period_id,
            template_id,
            evaluator_id,
            evaluatee_id,
            answers: self
                .answers
                .iter()
                .map(|(question_id, score)| AnswerScore {
                    question_id: *question_id,
                    score: *score,
                })
                .collect(),
        })
    }

    pub fn reset(&mut self) {
        let seq = self.load_seq;
        *self = SurveyForm::default();
        // Keep the sequence monotonic across resets so in-flight loads from
        // before the reset stay stale.
        self.load_seq = seq;
    }
}
