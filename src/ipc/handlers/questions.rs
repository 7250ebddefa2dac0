use serde_json::json;

use crate::calc::question_weight;
use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{optional_i64, required_i64, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let text = match required_str(&req.params, "text") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let topic_id = match required_i64(&req.params, "topicId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    // Weight defaults to 1.0, like the entry form did.
    let weight = match req.params.get("weight") {
        None => 1.0,
        Some(v) => match v.as_f64() {
            Some(w) => w,
            None => return err(&req.id, "bad_params", "weight must be a number", None),
        },
    };
    if !(0.0..=1.0).contains(&weight) {
        return err(
            &req.id,
            "bad_params",
            "weight must be between 0.00 and 1.00 (0.7 = 70%)",
            None,
        );
    }
    match backend.create_question(&text, weight, topic_id) {
        Ok(()) => ok(&req.id, json!({ "created": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

/// The reference question pool, with each question's weight resolved for an
/// optional evaluatee — what the survey and assignment views print in their
/// weight column.
fn handle_pool(state: &mut AppState, req: &Request) -> serde_json::Value {
    let person = match optional_i64(&req.params, "personId") {
        Ok(None) => None,
        Ok(Some(pid)) => match state.catalog.person(pid) {
            Some(p) => Some(p),
            None => return err(&req.id, "not_found", format!("person {} not found", pid), None),
        },
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let rows: Vec<serde_json::Value> = state
        .catalog
        .questions
        .iter()
        .map(|q| {
            json!({
                "id": q.id,
                "area": q.area,
                "areaTitle": q.area.title(),
                "topic": q.topic,
                "text": q.text,
                "defaultWeight": q.default_weight,
                "resolvedWeight": question_weight(q, person),
            })
        })
        .collect();

    ok(&req.id, json!({ "questions": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "questions.create" => Some(handle_create(state, req)),
        "questions.pool" => Some(handle_pool(state, req)),
        _ => None,
    }
}
