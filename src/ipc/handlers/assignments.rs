use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::params::optional_i64;
use crate::ipc::types::{AppState, Request};

/// Review assignments from the reference data: who evaluates whom in which
/// cycle, with names resolved for display.
fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let cycle_id = match optional_i64(&req.params, "cycleId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let evaluator_id = match optional_i64(&req.params, "evaluatorId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let catalog = &state.catalog;
    let rows: Vec<serde_json::Value> = catalog
        .assignments
        .iter()
        .filter(|a| cycle_id.map(|c| a.cycle_id == c).unwrap_or(true))
        .filter(|a| {
            evaluator_id
                .map(|e| a.evaluator_ids.contains(&e))
                .unwrap_or(true)
        })
        .map(|a| {
            let evaluatee = catalog.person(a.evaluatee_id);
            let evaluators: Vec<serde_json::Value> = a
                .evaluator_ids
                .iter()
                .filter_map(|id| catalog.person(*id))
                .map(|p| json!({ "id": p.id, "name": p.name, "role": p.role }))
                .collect();
            json!({
                "id": a.id,
                "cycle": catalog.cycle(a.cycle_id).map(|c| c.name.clone()),
                "surveyType": catalog.survey_type(a.survey_type_id).map(|t| t.name.clone()),
                "evaluatee": evaluatee.map(|p| json!({
                    "id": p.id,
                    "name": p.name,
                    "role": p.role,
                    "title": p.title,
                })),
                "evaluators": evaluators,
            })
        })
        .collect();

    ok(&req.id, json!({ "assignments": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.list" => Some(handle_list(state, req)),
        _ => None,
    }
}
