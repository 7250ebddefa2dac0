use serde_json::json;

use crate::ipc::error::{backend_err, err, ok};
use crate::ipc::types::{AppState, Request};

/// Entity counts plus the most recent submission records, enough for the
/// landing view.
fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "select a backend first", None);
    };

    let people = match backend.list_people() {
        Ok(v) => v,
        Err(e) => return backend_err(&req.id, &e),
    };
    let periods = match backend.list_periods() {
        Ok(v) => v,
        Err(e) => return backend_err(&req.id, &e),
    };
    let templates = match backend.list_templates() {
        Ok(v) => v,
        Err(e) => return backend_err(&req.id, &e),
    };

    let catalog = &state.catalog;
    let mut recent: Vec<&crate::catalog::SavedSurveyDef> = catalog.saved_surveys.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let recent: Vec<serde_json::Value> = recent
        .into_iter()
        .take(5)
        .map(|s| {
            json!({
                "id": s.id,
                "evaluatee": catalog.person(s.evaluatee_id).map(|p| p.name.clone()),
                "date": s.date,
                "status": s.status,
                "avgScore": s.avg_score,
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "mode": backend.mode(),
            "peopleCount": people.len(),
            "periodCount": periods.len(),
            "templateCount": templates.len(),
            "assignmentCount": catalog.assignments.len(),
            "recentSurveys": recent,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}
