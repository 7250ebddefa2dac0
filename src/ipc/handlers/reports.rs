use serde_json::json;

use crate::calc::{question_weight, score_to_percent};
use crate::catalog::Role;
use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{required_i64, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_overall(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let period_id = match required_i64(&req.params, "periodId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let template_id = match required_i64(&req.params, "templateId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.overall_scores(period_id, template_id) {
        Ok(rows) => {
            let scores: Vec<serde_json::Value> = rows
                .into_iter()
                .map(|r| {
                    json!({
                        "personId": r.person_id,
                        "name": r.name,
                        "score": r.score,
                        "percent": score_to_percent(r.score),
                    })
                })
                .collect();
            ok(&req.id, json!({ "scores": scores }))
        }
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_person(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let person_id = match required_str(&req.params, "personId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let period_id = match required_i64(&req.params, "periodId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let template_id = match required_i64(&req.params, "templateId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.person_score(&person_id, period_id, template_id) {
        Ok(score) => ok(
            &req.id,
            json!({
                "personId": person_id,
                "score": score,
                "percent": score_to_percent(score),
            }),
        ),
        Err(e) => backend_err(&req.id, &e),
    }
}

/// The person card of the report view: identity, manager, the weight each
/// pool question resolves to for this person, and how much each evaluator
/// role's scores would count.
fn handle_profile(state: &mut AppState, req: &Request) -> serde_json::Value {
    let person_id = match required_i64(&req.params, "personId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let Some(person) = state.catalog.person(person_id) else {
        return err(&req.id, "not_found", format!("person {} not found", person_id), None);
    };
    let manager = person
        .manager_id
        .and_then(|id| state.catalog.person(id))
        .map(|m| m.name.clone());

    let weights: Vec<serde_json::Value> = state
        .catalog
        .questions
        .iter()
        .map(|q| {
            json!({
                "questionId": q.id,
                "topic": q.topic,
                "areaTitle": q.area.title(),
                "weight": question_weight(q, Some(person)),
            })
        })
        .collect();

    let multipliers: Vec<serde_json::Value> = Role::ALL
        .iter()
        .map(|evaluator| {
            json!({
                "evaluatorRole": evaluator,
                "multiplier": state.multipliers.multiplier(*evaluator, person.role),
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "person": person,
            "manager": manager,
            "questionWeights": weights,
            "roleMultipliers": multipliers,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.overall" => Some(handle_overall(state, req)),
        "reports.person" => Some(handle_person(state, req)),
        "reports.profile" => Some(handle_profile(state, req)),
        _ => None,
    }
}
