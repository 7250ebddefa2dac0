use serde_json::json;

use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{optional_str, required_i64, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_topics() {
        Ok(topics) => ok(&req.id, json!({ "topics": topics })),
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
    let category_id = match required_i64(&req.params, "categoryId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let description = optional_str(&req.params, "description");
    match backend.create_topic(&name, description.as_deref(), category_id) {
        Ok(topic) => ok(&req.id, json!({ "topic": topic })),
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
    match backend.delete_topic(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "topics.list" => Some(handle_list(state, req)),
        "topics.create" => Some(handle_create(state, req)),
        "topics.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
