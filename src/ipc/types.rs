use serde::Deserialize;

use crate::backend::Backend;
use crate::calc::RoleMultipliers;
use crate::catalog::Catalog;
use crate::form::SurveyForm;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub backend: Option<Box<dyn Backend>>,
    pub catalog: Catalog,
    pub multipliers: RoleMultipliers,
    pub survey: SurveyForm,
}

impl AppState {
    pub fn new() -> AppState {
        AppState {
            backend: None,
            catalog: Catalog::sample(),
            multipliers: RoleMultipliers::standard(),
            survey: SurveyForm::default(),
        }
    }
}
