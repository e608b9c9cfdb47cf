use crate::ipc::error::ApiError;
use crate::ipc::types::Request;
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;

pub fn parse_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid {entity} ID")))
}

/// A missing body decodes like `{}` so that all-optional patches still parse.
pub fn parse_body<T: DeserializeOwned>(req: &Request) -> Result<T, ApiError> {
    let body = if req.body.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        req.body.clone()
    };
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub fn required_str(value: &str, field: &str) -> Result<String, ApiError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(v.to_string())
}

pub fn required_id(value: i64, field: &str) -> Result<i64, ApiError> {
    if value <= 0 {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(value)
}

pub fn parse_study_date(value: &str) -> Result<String, ApiError> {
    let v = required_str(value, "study_date")?;
    NaiveDate::parse_from_str(&v, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| ApiError::BadRequest("study_date must be YYYY-MM-DD".to_string()))
}

pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Maps "no row touched" to a not-found error.
pub fn ensure_affected(rows: usize, entity: &str) -> Result<(), ApiError> {
    if rows == 0 {
        return Err(ApiError::NotFound(format!("{entity} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("12", "topic").expect("id"), 12);
        for raw in ["", "abc", "0", "-3", "1.5"] {
            let e = parse_id(raw, "topic").expect_err(raw);
            assert_eq!(e.to_string(), "Invalid topic ID");
        }
    }

    #[test]
    fn study_dates_are_normalised() {
        assert_eq!(parse_study_date("2025-1-5").expect("date"), "2025-01-05");
        assert!(parse_study_date("05/01/2025").is_err());
        assert_eq!(
            parse_study_date("").expect_err("empty").to_string(),
            "study_date is required"
        );
    }
}
