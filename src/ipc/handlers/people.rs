use serde_json::json;

use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_people_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_people() {
        Ok(people) => ok(&req.id, json!({ "people": people })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_people_titles(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_titles() {
        Ok(titles) => ok(&req.id, json!({ "titles": titles })),
        Err(e) => backend_err(&req.id, &e),
    }
}

// The reference directory with manager links resolved; this is catalog data,
// independent of the selected backend.
fn handle_people_directory(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut rows = Vec::with_capacity(state.catalog.people.len());
    for person in &state.catalog.people {
        let mut value = match serde_json::to_value(person) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "internal", e.to_string(), None),
        };
        let manager = person
            .manager_id
            .and_then(|id| state.catalog.person(id))
            .map(|m| m.name.clone());
        if let Some(obj) = value.as_object_mut() {
            obj.insert("manager".to_string(), json!(manager));
        }
        rows.push(value);
    }
    ok(&req.id, json!({ "people": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "people.list" => Some(handle_people_list(state, req)),
        "people.titles" => Some(handle_people_titles(state, req)),
        "people.directory" => Some(handle_people_directory(state, req)),
        _ => None,
    }
}
