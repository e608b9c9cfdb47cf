use crate::ipc::error::{ApiError, Reply};
use crate::ipc::helpers::{ensure_affected, parse_body, parse_id, required_id, required_str};
use crate::ipc::router::Route;
use crate::ipc::types::{AppState, Request};
use crate::models::{CreateTopicInput, Topic, TopicPatch};

fn handle_topics_by_subject(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let subject_id = parse_id(raw_id, "subject")?;
    let mut stmt = state.db.prepare(
        "SELECT id, subject_id, name, is_completed, is_weak, created_at
         FROM topics
         WHERE subject_id = ?
         ORDER BY id",
    )?;
    let topics = stmt
        .query_map([subject_id], |r| {
            Ok(Topic {
                id: r.get(0)?,
                subject_id: r.get(1)?,
                name: r.get(2)?,
                is_completed: r.get(3)?,
                is_weak: r.get(4)?,
                created_at: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Reply::ok("Topics retrieved", topics)
}

fn handle_topics_create(state: &AppState, req: &Request) -> Result<Reply, ApiError> {
    let input: CreateTopicInput = parse_body(req)?;
    let subject_id = required_id(input.subject_id, "subject_id")?;
    let name = required_str(&input.name, "name")?;

    state.db.execute(
        "INSERT INTO topics(subject_id, name) VALUES(?, ?)",
        (subject_id, &name),
    )?;
    Ok(Reply::created("Topic created", state.db.last_insert_rowid()))
}

fn handle_topics_update(state: &AppState, req: &Request, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "topic")?;
    let patch: TopicPatch = parse_body(req)?;
    if patch.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let changed = state.db.execute(
        "UPDATE topics
         SET name = COALESCE(NULLIF(?1, ''), name),
             is_completed = COALESCE(?2, is_completed),
             is_weak = COALESCE(?3, is_weak)
         WHERE id = ?4",
        (patch.name.trim(), patch.is_completed, patch.is_weak, id),
    )?;
    ensure_affected(changed, "Topic")?;
    Ok(Reply::done("Topic updated"))
}

fn handle_topics_toggle_complete(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "topic")?;
    let changed = state.db.execute(
        "UPDATE topics SET is_completed = NOT is_completed WHERE id = ?",
        [id],
    )?;
    ensure_affected(changed, "Topic")?;
    Ok(Reply::done("Topic completion toggled"))
}

fn handle_topics_toggle_weak(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "topic")?;
    let changed = state
        .db
        .execute("UPDATE topics SET is_weak = NOT is_weak WHERE id = ?", [id])?;
    ensure_affected(changed, "Topic")?;
    Ok(Reply::done("Topic weak status toggled"))
}

fn handle_topics_delete(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "topic")?;
    let removed = state.db.execute("DELETE FROM topics WHERE id = ?", [id])?;
    ensure_affected(removed, "Topic")?;
    Ok(Reply::done("Topic deleted"))
}

pub fn try_handle(
    state: &AppState,
    req: &Request,
    route: &Route,
) -> Option<Result<Reply, ApiError>> {
    match (route.method.as_str(), route.segments.as_slice()) {
        ("GET", ["subjects", id, "topics"]) => Some(handle_topics_by_subject(state, id)),
        ("POST", ["topics"]) => Some(handle_topics_create(state, req)),
        ("PUT", ["topics", id]) => Some(handle_topics_update(state, req, id)),
        ("PUT", ["topics", id, "complete"]) => Some(handle_topics_toggle_complete(state, id)),
        ("PUT", ["topics", id, "weak"]) => Some(handle_topics_toggle_weak(state, id)),
        ("DELETE", ["topics", id]) => Some(handle_topics_delete(state, id)),
        _ => None,
    }
}
