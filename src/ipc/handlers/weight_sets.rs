use serde_json::json;

use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{optional_str, required_f64, required_i64, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_weight_sets() {
        Ok(sets) => ok(&req.id, json!({ "weightSets": sets })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let name = match required_str(&req.params, "name") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let description = optional_str(&req.params, "description");
    match backend.create_weight_set(&name, description.as_deref()) {
        Ok(set) => ok(&req.id, json!({ "weightSet": set })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let id = match required_i64(&req.params, "id") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.delete_weight_set(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let id = match required_i64(&req.params, "id") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.weight_set_detail(id) {
        Ok(detail) => {
            // The admin page flags sets whose topic weights exceed a full 1.0.
            let total: f64 = detail.topic_weights.iter().map(|tw| tw.weight).sum();
            ok(
                &req.id,
                json!({
                    "weightSet": detail,
                    "totalWeight": total,
                    "overLimit": total > 1.0,
                }),
            )
        }
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_set_topic_weight(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let set_id = match required_i64(&req.params, "setId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let topic_id = match required_i64(&req.params, "topicId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let weight = match required_f64(&req.params, "weight") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if !(0.0..=1.0).contains(&weight) {
        return err(
            &req.id,
            "bad_params",
            "weight must be between 0.00 and 1.00 (0.7 = 70%)",
            None,
        );
    }
    match backend.set_topic_weight(set_id, topic_id, weight) {
        Ok(()) => ok(&req.id, json!({ "saved": true, "weight": weight })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_assignments(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_title_assignments() {
        Ok(assignments) => ok(&req.id, json!({ "assignments": assignments })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_assign_title(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let title = match required_str(&req.params, "title") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let set_id = match required_i64(&req.params, "setId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.assign_title(&title, set_id) {
        Ok(()) => ok(&req.id, json!({ "assigned": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_remove_title(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let title = match required_str(&req.params, "title") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.remove_title_assignment(&title) {
        Ok(()) => ok(&req.id, json!({ "removed": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "weightSets.list" => Some(handle_list(state, req)),
        "weightSets.create" => Some(handle_create(state, req)),
        "weightSets.delete" => Some(handle_delete(state, req)),
        "weightSets.get" => Some(handle_get(state, req)),
        "weightSets.setTopicWeight" => Some(handle_set_topic_weight(state, req)),
        "weightSets.assignments" => Some(handle_assignments(state, req)),
        "weightSets.assignTitle" => Some(handle_assign_title(state, req)),
        "weightSets.removeTitle" => Some(handle_remove_title(state, req)),
        _ => None,
    }
}
