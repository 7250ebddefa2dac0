use serde_json::json;

use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{optional_str, required_i64, required_str};
use crate::ipc::types::{AppState, Request};

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    match backend.list_templates() {
        Ok(templates) => ok(&req.id, json!({ "templates": templates })),
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
    match backend.create_template(&name, description.as_deref()) {
        Ok(template) => ok(&req.id, json!({ "template": template })),
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
    match backend.template_detail(id) {
        Ok(detail) => {
            let question_count = detail.question_count();
            ok(
                &req.id,
                json!({ "template": detail, "questionCount": question_count }),
            )
        }
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_attach(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let template_id = match required_i64(&req.params, "templateId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let topic_id = match required_i64(&req.params, "topicId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.attach_topic(template_id, topic_id) {
        Ok(()) => ok(&req.id, json!({ "attached": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

fn handle_detach(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_mut() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };
    let template_id = match required_i64(&req.params, "templateId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let topic_id = match required_i64(&req.params, "topicId") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    match backend.detach_topic(template_id, topic_id) {
        Ok(()) => ok(&req.id, json!({ "detached": true })),
        Err(e) => backend_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "templates.list" => Some(handle_list(state, req)),
        "templates.create" => Some(handle_create(state, req)),
        "templates.get" => Some(handle_get(state, req)),
        "templates.attachTopic" => Some(handle_attach(state, req)),
        "templates.detachTopic" => Some(handle_detach(state, req)),
        _ => None,
    }
}
