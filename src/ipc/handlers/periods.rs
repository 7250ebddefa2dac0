use serde_json::json;

use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{required_date, required_i64, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_periods() {
        Ok(periods) => ok(&req.id, json!({ "periods": periods })),
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
    let starts_on = match required_date(&req.params, "startsOn") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let ends_on = match required_date(&req.params, "endsOn") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if ends_on < starts_on {
        return err(&req.id, "bad_params", "endsOn precedes startsOn", None);
    }
    match backend.create_period(&name, starts_on, ends_on) {
        Ok(period) => ok(&req.id, json!({ "period": period })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let id = match required_i64(&req.params, "id") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let name = match required_str(&req.params, "name") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let starts_on = match required_date(&req.params, "startsOn") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let ends_on = match required_date(&req.params, "endsOn") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if ends_on < starts_on {
        return err(&req.id, "bad_params", "endsOn precedes startsOn", None);
    }
    match backend.update_period(id, &name, starts_on, ends_on) {
        Ok(period) => ok(&req.id, json!({ "period": period })),
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
    match backend.delete_period(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "periods.list" => Some(handle_list(state, req)),
        "periods.create" => Some(handle_create(state, req)),
        "periods.update" => Some(handle_update(state, req)),
        "periods.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
