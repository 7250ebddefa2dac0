use serde_json::json;

use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{optional_str, required_i64, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_categories() {
        Ok(categories) => ok(&req.id, json!({ "categories": categories })),
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
    match backend.create_category(&name, description.as_deref()) {
        Ok(category) => ok(&req.id, json!({ "category": category })),
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
    match backend.delete_category(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "categories.list" => Some(handle_list(state, req)),
        "categories.create" => Some(handle_create(state, req)),
        "categories.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
