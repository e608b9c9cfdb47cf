use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// A successful outcome before it is wrapped in the envelope.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl Reply {
    pub fn ok(message: &str, data: impl Serialize) -> Result<Self, ApiError> {
        let data = serde_json::to_value(data).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self {
            status: 200,
            message: message.to_string(),
            data: Some(data),
        })
    }

    pub fn created(message: &str, id: i64) -> Self {
        Self {
            status: 201,
            message: message.to_string(),
            data: Some(json!({ "id": id })),
        }
    }

    pub fn done(message: &str) -> Self {
        Self {
            status: 200,
            message: message.to_string(),
            data: None,
        }
    }
}

pub fn ok(id: &str, reply: Reply) -> serde_json::Value {
    let mut resp = json!({
        "id": id,
        "status": reply.status,
        "success": true,
        "message": reply.message,
    });
    if let Some(d) = reply.data {
        resp["data"] = d;
    }
    resp
}

pub fn err(id: &str, error: &ApiError) -> serde_json::Value {
    json!({
        "id": id,
        "status": error.status(),
        "success": false,
        "message": error.to_string(),
    })
}

/// Reply for a line that could not be parsed; there is no id to echo.
pub fn bad_json(e: serde_json::Error) -> serde_json::Value {
    json!({
        "status": 400,
        "success": false,
        "message": format!("invalid request: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_data_when_absent() {
        let v = ok("7", Reply::done("Topic deleted"));
        assert_eq!(v["success"], true);
        assert_eq!(v["status"], 200);
        assert!(v.get("data").is_none());

        let v = ok("8", Reply::created("Topic created", 3));
        assert_eq!(v["status"], 201);
        assert_eq!(v["data"]["id"], 3);
    }

    #[test]
    fn error_status_follows_variant() {
        let v = err("1", &ApiError::NotFound("Subject not found".into()));
        assert_eq!(v["status"], 404);
        assert_eq!(v["success"], false);
        assert_eq!(v["message"], "Subject not found");
        assert_eq!(ApiError::BadRequest(String::new()).status(), 400);
        assert_eq!(ApiError::Internal(String::new()).status(), 500);
    }
}
