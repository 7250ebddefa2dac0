use serde_json::json;

use crate::backend::{Backend, BackendError, HttpBackend, MemoryBackend};
use crate::catalog::Catalog;
use crate::form::SurveyForm;
use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::params::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};

/// Environment fallback for the evaluation service address.
pub const BASE_URL_ENV: &str = "KURUMSAL360_API_BASE_URL";

pub fn build_backend(
    mode: &str,
    base_url: Option<&str>,
    catalog: &Catalog,
) -> Result<Box<dyn Backend>, BackendError> {
    match mode {
        "memory" => Ok(Box::new(MemoryBackend::seeded(catalog)?)),
        "http" => {
            let from_env = std::env::var(BASE_URL_ENV).ok();
            let base_url = base_url
                .map(str::to_string)
                .or(from_env)
                .ok_or_else(|| {
                    BackendError::Invalid(format!(
                        "http backend needs a base url (baseUrl param or {})",
                        BASE_URL_ENV
                    ))
                })?;
            Ok(Box::new(HttpBackend::new(&base_url)?))
        }
        other => Err(BackendError::Invalid(format!(
            "unknown backend mode: {} (expected memory or http)",
            other
        ))),
    }
}

fn handle_backend_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mode = match required_str(&req.params, "mode") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let base_url = optional_str(&req.params, "baseUrl");

    let backend = match build_backend(&mode, base_url.as_deref(), &state.catalog) {
        Ok(b) => b,
        Err(e) => return backend_err(&req.id, &e),
    };
    tracing::info!(mode = backend.mode(), "backend selected");
    state.backend = Some(backend);
    // Selections from the previous data source are meaningless now.
    state.survey.reset();

    ok(&req.id, json!({ "mode": mode }))
}

fn handle_backend_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mode = state.backend.as_ref().map(|b| b.mode());
    ok(&req.id, json!({ "mode": mode, "selected": mode.is_some() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backend.select" => Some(handle_backend_select(state, req)),
        "backend.status" => Some(handle_backend_status(state, req)),
        _ => None,
    }
}
