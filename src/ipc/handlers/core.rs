use crate::ipc::error::{ApiError, Reply};
use crate::ipc::router::Route;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &AppState) -> Result<Reply, ApiError> {
    Reply::ok(
        "OK",
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "exam_date": state.config.exam_date_raw,
            "database": state.config.db_path.to_string_lossy(),
        }),
    )
}

pub fn try_handle(
    state: &AppState,
    _req: &Request,
    route: &Route,
) -> Option<Result<Reply, ApiError>> {
    match (route.method.as_str(), route.segments.as_slice()) {
        ("GET", ["health"]) => Some(handle_health(state)),
        _ => None,
    }
}
