use chrono::NaiveDate;

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, String> {
    match params.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(_) => Err(format!("{} must not be empty", key)),
        None => Err(format!("missing {}", key)),
    }
}

/// Absent, null, or blank all mean "not provided".
pub fn optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn required_i64(params: &serde_json::Value, key: &str) -> Result<i64, String> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| format!("{} must be an integer", key))
}

pub fn optional_i64(params: &serde_json::Value, key: &str) -> Result<Option<i64>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("{} must be an integer or null", key)),
    }
}

pub fn required_f64(params: &serde_json::Value, key: &str) -> Result<f64, String> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| format!("{} must be a number", key))
}

pub fn optional_u64(params: &serde_json::Value, key: &str) -> Result<Option<u64>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("{} must be a non-negative integer", key)),
    }
}

pub fn required_date(params: &serde_json::Value, key: &str) -> Result<NaiveDate, String> {
    let raw = required_str(params, key)?;
    raw.parse::<NaiveDate>()
        .map_err(|_| format!("{} must be a YYYY-MM-DD date", key))
}

pub fn bool_flag(params: &serde_json::Value, key: &str) -> bool {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}
