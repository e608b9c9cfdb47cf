use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::{err, ok, ApiError, Reply};

/// A request path split into segments below `/api`.
#[derive(Debug, PartialEq)]
pub struct Route<'a> {
    pub method: String,
    pub segments: Vec<&'a str>,
}

impl<'a> Route<'a> {
    pub fn parse(method: &str, path: &'a str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or_default();
        let rest = path.strip_prefix("/api")?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        Some(Self {
            method: method.trim().to_ascii_uppercase(),
            segments: rest.split('/').filter(|s| !s.is_empty()).collect(),
        })
    }
}

pub fn handle_request(state: &AppState, req: Request) -> serde_json::Value {
    match dispatch(state, &req) {
        Ok(reply) => {
            tracing::debug!(method = %req.method, path = %req.path, status = reply.status, "handled");
            ok(&req.id, reply)
        }
        Err(e) => {
            if let ApiError::Internal(msg) = &e {
                tracing::error!(method = %req.method, path = %req.path, error = %msg, "store failure");
            } else {
                tracing::debug!(method = %req.method, path = %req.path, status = e.status(), "rejected");
            }
            err(&req.id, &e)
        }
    }
}

fn dispatch(state: &AppState, req: &Request) -> Result<Reply, ApiError> {
    let no_route = || ApiError::NotFound(format!("no route for {} {}", req.method, req.path));
    let Some(route) = Route::parse(&req.method, &req.path) else {
        return Err(no_route());
    };

    if let Some(resp) = handlers::core::try_handle(state, req, &route) {
        return resp;
    }
    if let Some(resp) = handlers::dashboard::try_handle(state, req, &route) {
        return resp;
    }
    if let Some(resp) = handlers::subjects::try_handle(state, req, &route) {
        return resp;
    }
    if let Some(resp) = handlers::topics::try_handle(state, req, &route) {
        return resp;
    }
    if let Some(resp) = handlers::notes::try_handle(state, req, &route) {
        return resp;
    }
    if let Some(resp) = handlers::study_plan::try_handle(state, req, &route) {
        return resp;
    }

    Err(no_route())
}
