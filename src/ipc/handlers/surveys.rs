use serde_json::json;

use crate::form::EvaluatorChoice;
use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{bool_flag, optional_i64, optional_str, optional_u64, required_i64};
use crate::ipc::types::{AppState, Request};

/// Applies whichever selections the caller sent. The evaluator field mirrors
/// the entry form: a person id, or the literal "anonim" for an anonymous
/// submission.
fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    match optional_i64(&req.params, "periodId") {
        Ok(Some(period_id)) => state.survey.set_period(Some(period_id)),
        Ok(None) => {}
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    }
    if let Some(evaluatee_id) = optional_str(&req.params, "evaluateeId") {
        state.survey.set_evaluatee(Some(evaluatee_id));
    }
    if let Some(evaluator) = optional_str(&req.params, "evaluator") {
        let choice = if evaluator == "anonim" {
            EvaluatorChoice::Anonymous
        } else {
            EvaluatorChoice::Person(evaluator)
        };
        state.survey.set_evaluator(choice);
    }
    ok(&req.id, json!({ "status": state.survey.status() }))
}

fn handle_select_template(state: &mut AppState, req: &Request) -> serde_json::Value {
    let template_id = match required_i64(&req.params, "templateId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let load_seq = state.survey.select_template(template_id);
    ok(&req.id, json!({ "loadSeq": load_seq }))
}

/// Fetches the detail for the currently selected template and applies it,
/// guarded by the load sequence: a load issued for an earlier selection is
/// reported stale and never touches the form.
fn handle_load_template(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let Some(template_id) = state.survey.selected_template() else {
        return err(&req.id, "bad_params", "select a template first", None);
    };
    let seq = match optional_u64(&req.params, "seq") {
        Ok(v) => v.unwrap_or_else(|| state.survey.current_seq()),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if seq != state.survey.current_seq() {
        return ok(&req.id, json!({ "applied": false, "stale": true }));
    }

    let detail = match backend.template_detail(template_id) {
        Ok(d) => d,
        Err(e) => return backend_err(&req.id, &e),
    };
    let applied = state.survey.apply_template_detail(seq, detail);
    let result = if applied {
        json!({
            "applied": true,
            "stale": false,
            "template": state.survey.template_detail(),
            "status": state.survey.status(),
        })
    } else {
        json!({ "applied": false, "stale": true })
    };
    ok(&req.id, result)
}

fn handle_set_score(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(&req.params, "questionId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let score = match required_i64(&req.params, "score") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if let Err(msg) = state.survey.set_score(question_id, score) {
        return err(&req.id, "bad_params", msg, None);
    }
    ok(&req.id, json!({ "status": state.survey.status() }))
}

fn handle_clear_score(state: &mut AppState, req: &Request) -> serde_json::Value {
    let question_id = match required_i64(&req.params, "questionId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    state.survey.clear_score(question_id);
    ok(&req.id, json!({ "status": state.survey.status() }))
}

fn handle_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "status": state.survey.status() }))
}

/// Submits the form. An incomplete form needs allowIncomplete, the protocol
/// version of the "continue anyway?" confirmation.
fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let batch = match state.survey.build_batch() {
        Ok(b) => b,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if !state.survey.is_complete() && !bool_flag(&req.params, "allowIncomplete") {
        let (answered, total) = state.survey.completeness();
        return err(
            &req.id,
            "incomplete_answers",
            "not every question is answered",
            Some(json!({ "answered": answered, "total": total })),
        );
    }

    if let Err(e) = backend.submit_answers(&batch) {
        return backend_err(&req.id, &e);
    }
    tracing::info!(
        period = batch.period_id,
        template = batch.template_id,
        answers = batch.answers.len(),
        "survey submitted"
    );
    let submitted = batch.answers.len();
    state.survey.reset();
    ok(&req.id, json!({ "submitted": submitted }))
}

fn handle_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.survey.reset();
    ok(&req.id, json!({ "status": state.survey.status() }))
}

/// Sample submission records, optionally filtered by cycle, with names
/// resolved for display.
fn handle_saved(state: &mut AppState, req: &Request) -> serde_json::Value {
    let cycle_id = match optional_i64(&req.params, "cycleId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let catalog = &state.catalog;
    let rows: Vec<serde_json::Value> = catalog
        .saved_surveys
        .iter()
        .filter(|s| cycle_id.map(|c| s.cycle_id == c).unwrap_or(true))
        .map(|s| {
            let evaluatee = catalog.person(s.evaluatee_id).map(|p| p.name.clone());
            let evaluator = catalog.person(s.evaluator_id).map(|p| p.name.clone());
            let survey_type = catalog
                .survey_type(s.survey_type_id)
                .map(|t| t.name.clone());
            let cycle = catalog.cycle(s.cycle_id).map(|c| c.name.clone());
            json!({
                "id": s.id,
                "cycle": cycle,
                "surveyType": survey_type,
                "evaluatee": evaluatee,
                "evaluator": evaluator,
                "date": s.date,
                "status": s.status,
                "avgScore": s.avg_score,
            })
        })
        .collect();
    ok(&req.id, json!({ "surveys": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "survey.open" => Some(handle_open(state, req)),
        "survey.selectTemplate" => Some(handle_select_template(state, req)),
        "survey.loadTemplate" => Some(handle_load_template(state, req)),
        "survey.setScore" => Some(handle_set_score(state, req)),
        "survey.clearScore" => Some(handle_clear_score(state, req)),
        "survey.status" => Some(handle_status(state, req)),
        "survey.submit" => Some(handle_submit(state, req)),
        "survey.reset" => Some(handle_reset(state, req)),
        "surveys.saved" => Some(handle_saved(state, req)),
        _ => None,
    }
}
