use crate::db::NOW_SQL;
use crate::ipc::error::{ApiError, Reply};
use crate::ipc::helpers::{ensure_affected, parse_body, parse_id, required_id, required_str};
use crate::ipc::router::Route;
use crate::ipc::types::{AppState, Request};
use crate::models::{CreateNoteInput, Note, NotePatch};
use rusqlite::Connection;

fn load_notes(conn: &Connection, subject_id: Option<i64>) -> rusqlite::Result<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, subject_id, topic_id, title, content, created_at, updated_at
         FROM notes
         WHERE ?1 IS NULL OR subject_id = ?1
         ORDER BY updated_at DESC, id DESC",
    )?;
    let notes = stmt
        .query_map([subject_id], |r| {
            Ok(Note {
                id: r.get(0)?,
                subject_id: r.get(1)?,
                topic_id: r.get(2)?,
                title: r.get(3)?,
                content: r.get(4)?,
                created_at: r.get(5)?,
                updated_at: r.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(notes)
}

fn handle_notes_list(state: &AppState) -> Result<Reply, ApiError> {
    Reply::ok("Notes retrieved", load_notes(&state.db, None)?)
}

fn handle_notes_by_subject(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let subject_id = parse_id(raw_id, "subject")?;
    Reply::ok("Notes retrieved", load_notes(&state.db, Some(subject_id))?)
}

fn handle_notes_create(state: &AppState, req: &Request) -> Result<Reply, ApiError> {
    let input: CreateNoteInput = parse_body(req)?;
    let subject_id = required_id(input.subject_id, "subject_id")?;
    let title = required_str(&input.title, "title")?;

    state.db.execute(
        "INSERT INTO notes(subject_id, topic_id, title, content) VALUES(?, ?, ?, ?)",
        (subject_id, input.topic_id, &title, &input.content),
    )?;
    Ok(Reply::created("Note created", state.db.last_insert_rowid()))
}

fn handle_notes_update(state: &AppState, req: &Request, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "note")?;
    let patch: NotePatch = parse_body(req)?;

    let sql = format!(
        "UPDATE notes
         SET title = COALESCE(NULLIF(?1, ''), title),
             content = ?2,
             topic_id = ?3,
             updated_at = {NOW_SQL}
         WHERE id = ?4"
    );
    let changed = state.db.execute(
        &sql,
        (patch.title.trim(), &patch.content, patch.topic_id, id),
    )?;
    ensure_affected(changed, "Note")?;
    Ok(Reply::done("Note updated"))
}

fn handle_notes_delete(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "note")?;
    let removed = state.db.execute("DELETE FROM notes WHERE id = ?", [id])?;
    ensure_affected(removed, "Note")?;
    Ok(Reply::done("Note deleted"))
}

pub fn try_handle(
    state: &AppState,
    req: &Request,
    route: &Route,
) -> Option<Result<Reply, ApiError>> {
    match (route.method.as_str(), route.segments.as_slice()) {
        ("GET", ["notes"]) => Some(handle_notes_list(state)),
        ("POST", ["notes"]) => Some(handle_notes_create(state, req)),
        ("GET", ["subjects", id, "notes"]) => Some(handle_notes_by_subject(state, id)),
        ("PUT", ["notes", id]) => Some(handle_notes_update(state, req, id)),
        ("DELETE", ["notes", id]) => Some(handle_notes_delete(state, id)),
        _ => None,
    }
}
