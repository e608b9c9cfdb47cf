use crate::ipc::error::{ApiError, Reply};
use crate::ipc::helpers::{
    ensure_affected, parse_body, parse_id, parse_study_date, required_id, today,
};
use crate::ipc::router::Route;
use crate::ipc::types::{AppState, Request};
use crate::models::{CreateStudyPlanInput, StudyPlanEntry, StudyPlanPatch};
use rusqlite::Connection;

const DEFAULT_HOURS_PLANNED: f64 = 1.0;

fn plan_entry(r: &rusqlite::Row<'_>) -> rusqlite::Result<StudyPlanEntry> {
    Ok(StudyPlanEntry {
        id: r.get(0)?,
        subject_id: r.get(1)?,
        subject_name: r.get(2)?,
        subject_color: r.get(3)?,
        study_date: r.get(4)?,
        hours_planned: r.get(5)?,
        hours_completed: r.get(6)?,
        notes: r.get(7)?,
        created_at: r.get(8)?,
    })
}

pub fn all_entries(conn: &Connection) -> rusqlite::Result<Vec<StudyPlanEntry>> {
    let mut stmt = conn.prepare(
        "SELECT sp.id, sp.subject_id, s.name, s.color, sp.study_date,
                sp.hours_planned, sp.hours_completed, COALESCE(sp.notes, ''), sp.created_at
         FROM study_plan sp
         JOIN subjects s ON s.id = sp.subject_id
         ORDER BY sp.study_date DESC, sp.id DESC",
    )?;
    let entries = stmt
        .query_map([], plan_entry)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Entries scheduled on `date` (`YYYY-MM-DD`), oldest first.
pub fn entries_on(conn: &Connection, date: &str) -> rusqlite::Result<Vec<StudyPlanEntry>> {
    let mut stmt = conn.prepare(
        "SELECT sp.id, sp.subject_id, s.name, s.color, sp.study_date,
                sp.hours_planned, sp.hours_completed, COALESCE(sp.notes, ''), sp.created_at
         FROM study_plan sp
         JOIN subjects s ON s.id = sp.subject_id
         WHERE sp.study_date = ?
         ORDER BY sp.id",
    )?;
    let entries = stmt
        .query_map([date], plan_entry)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

fn handle_plan_list(state: &AppState) -> Result<Reply, ApiError> {
    Reply::ok("Study plans retrieved", all_entries(&state.db)?)
}

fn handle_plan_today(state: &AppState) -> Result<Reply, ApiError> {
    Reply::ok("Today's study plan retrieved", entries_on(&state.db, &today())?)
}

fn handle_plan_create(state: &AppState, req: &Request) -> Result<Reply, ApiError> {
    let input: CreateStudyPlanInput = parse_body(req)?;
    let subject_id = required_id(input.subject_id, "subject_id")?;
    let study_date = parse_study_date(&input.study_date)?;
    let hours_planned = if input.hours_planned == 0.0 {
        DEFAULT_HOURS_PLANNED
    } else {
        input.hours_planned
    };

    state.db.execute(
        "INSERT INTO study_plan(subject_id, study_date, hours_planned, notes) VALUES(?, ?, ?, ?)",
        (subject_id, &study_date, hours_planned, &input.notes),
    )?;
    Ok(Reply::created("Study plan created", state.db.last_insert_rowid()))
}

fn handle_plan_update(state: &AppState, req: &Request, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "study plan")?;
    let patch: StudyPlanPatch = parse_body(req)?;
    if patch.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let changed = state.db.execute(
        "UPDATE study_plan
         SET hours_planned = COALESCE(?1, hours_planned),
             hours_completed = COALESCE(?2, hours_completed),
             notes = COALESCE(?3, notes)
         WHERE id = ?4",
        (
            patch.hours_planned,
            patch.hours_completed,
            patch.notes_value(),
            id,
        ),
    )?;
    ensure_affected(changed, "Study plan")?;
    Ok(Reply::done("Study plan updated"))
}

fn handle_plan_delete(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "study plan")?;
    let removed = state.db.execute("DELETE FROM study_plan WHERE id = ?", [id])?;
    ensure_affected(removed, "Study plan")?;
    Ok(Reply::done("Study plan deleted"))
}

pub fn try_handle(
    state: &AppState,
    req: &Request,
    route: &Route,
) -> Option<Result<Reply, ApiError>> {
    match (route.method.as_str(), route.segments.as_slice()) {
        ("GET", ["study-plan"]) => Some(handle_plan_list(state)),
        ("GET", ["study-plan", "today"]) => Some(handle_plan_today(state)),
        ("POST", ["study-plan"]) => Some(handle_plan_create(state, req)),
        ("PUT", ["study-plan", id]) => Some(handle_plan_update(state, req, id)),
        ("DELETE", ["study-plan", id]) => Some(handle_plan_delete(state, id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn add_entry(conn: &Connection, date: &str) {
        conn.execute(
            "INSERT INTO study_plan(subject_id, study_date) VALUES(1, ?)",
            [date],
        )
        .expect("entry");
    }

    #[test]
    fn entries_are_annotated_and_ordered() {
        let conn = open_in_memory();
        conn.execute(
            "INSERT INTO subjects(name, color) VALUES('Linux', '#FCC624')",
            [],
        )
        .expect("subject");
        add_entry(&conn, "2025-01-02");
        add_entry(&conn, "2025-01-05");
        add_entry(&conn, "2025-01-02");

        let all = all_entries(&conn).expect("all");
        let dates: Vec<&str> = all.iter().map(|e| e.study_date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-05", "2025-01-02", "2025-01-02"]);
        assert_eq!(all[0].subject_name, "Linux");
        assert_eq!(all[0].subject_color, "#FCC624");
        assert_eq!(all[0].hours_planned, 1.0);
        assert_eq!(all[0].hours_completed, 0.0);
        assert_eq!(all[0].notes, "");

        let day = entries_on(&conn, "2025-01-02").expect("day");
        let ids: Vec<i64> = day.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(entries_on(&conn, "2025-01-03").expect("empty").is_empty());
    }
}
