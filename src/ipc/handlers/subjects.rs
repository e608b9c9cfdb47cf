use crate::calc::TopicCounts;
use crate::db::DEFAULT_SUBJECT_COLOR;
use crate::ipc::error::{ApiError, Reply};
use crate::ipc::helpers::{ensure_affected, parse_body, parse_id, required_str};
use crate::ipc::router::Route;
use crate::ipc::types::{AppState, Request};
use crate::models::{CreateSubjectInput, Subject, SubjectPatch, SubjectWithProgress};
use rusqlite::Connection;

/// Subjects joined to their topics. `None` loads every subject.
pub fn subjects_with_progress(
    conn: &Connection,
    subject_id: Option<i64>,
) -> rusqlite::Result<Vec<SubjectWithProgress>> {
    let mut stmt = conn.prepare(
        "SELECT
           s.id,
           s.name,
           s.description,
           s.color,
           s.created_at,
           COUNT(t.id) AS total_topics,
           COALESCE(SUM(CASE WHEN t.is_completed THEN 1 ELSE 0 END), 0) AS completed_topics,
           COALESCE(SUM(CASE WHEN t.is_weak THEN 1 ELSE 0 END), 0) AS weak_topics
         FROM subjects s
         LEFT JOIN topics t ON t.subject_id = s.id
         WHERE ?1 IS NULL OR s.id = ?1
         GROUP BY s.id
         ORDER BY s.id",
    )?;
    let rows = stmt.query_map([subject_id], |r| {
        let counts = TopicCounts {
            total_topics: r.get(5)?,
            completed_topics: r.get(6)?,
            weak_topics: r.get(7)?,
        };
        Ok(SubjectWithProgress {
            subject: Subject {
                id: r.get(0)?,
                name: r.get(1)?,
                description: r.get(2)?,
                color: r.get(3)?,
                created_at: r.get(4)?,
            },
            progress: counts.progress(),
            counts,
        })
    })?;
    let subjects = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(subjects)
}

fn handle_subjects_list(state: &AppState) -> Result<Reply, ApiError> {
    let subjects = subjects_with_progress(&state.db, None)?;
    Reply::ok("Subjects retrieved", subjects)
}

fn handle_subjects_get(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "subject")?;
    let subject = subjects_with_progress(&state.db, Some(id))?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Subject not found".to_string()))?;
    Reply::ok("Subject retrieved", subject)
}

fn handle_subjects_create(state: &AppState, req: &Request) -> Result<Reply, ApiError> {
    let input: CreateSubjectInput = parse_body(req)?;
    let name = required_str(&input.name, "name")?;
    let color = match input.color.trim() {
        "" => DEFAULT_SUBJECT_COLOR,
        c => c,
    };

    state.db.execute(
        "INSERT INTO subjects(name, description, color) VALUES(?, ?, ?)",
        (&name, input.description.trim(), color),
    )?;
    Ok(Reply::created("Subject created", state.db.last_insert_rowid()))
}

fn handle_subjects_update(state: &AppState, req: &Request, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "subject")?;
    let patch: SubjectPatch = parse_body(req)?;

    let changed = state.db.execute(
        "UPDATE subjects
         SET name = COALESCE(NULLIF(?1, ''), name),
             description = COALESCE(NULLIF(?2, ''), description),
             color = COALESCE(NULLIF(?3, ''), color)
         WHERE id = ?4",
        (
            patch.name.trim(),
            patch.description.trim(),
            patch.color.trim(),
            id,
        ),
    )?;
    ensure_affected(changed, "Subject")?;
    Ok(Reply::done("Subject updated"))
}

fn handle_subjects_delete(state: &AppState, raw_id: &str) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id, "subject")?;
    let removed = state.db.execute("DELETE FROM subjects WHERE id = ?", [id])?;
    ensure_affected(removed, "Subject")?;
    Ok(Reply::done("Subject deleted"))
}

pub fn try_handle(
    state: &AppState,
    req: &Request,
    route: &Route,
) -> Option<Result<Reply, ApiError>> {
    match (route.method.as_str(), route.segments.as_slice()) {
        ("GET", ["subjects"]) => Some(handle_subjects_list(state)),
        ("POST", ["subjects"]) => Some(handle_subjects_create(state, req)),
        ("GET", ["subjects", id]) => Some(handle_subjects_get(state, id)),
        ("PUT", ["subjects", id]) => Some(handle_subjects_update(state, req, id)),
        ("DELETE", ["subjects", id]) => Some(handle_subjects_delete(state, id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn add_topic(conn: &Connection, subject_id: i64, completed: bool, weak: bool) {
        conn.execute(
            "INSERT INTO topics(subject_id, name, is_completed, is_weak) VALUES(?, 't', ?, ?)",
            (subject_id, completed, weak),
        )
        .expect("topic");
    }

    #[test]
    fn progress_counts_per_subject() {
        let conn = open_in_memory();
        conn.execute("INSERT INTO subjects(name) VALUES('Math')", [])
            .expect("subject");
        conn.execute("INSERT INTO subjects(name) VALUES('Empty')", [])
            .expect("subject");
        add_topic(&conn, 1, true, false);
        add_topic(&conn, 1, false, true);
        add_topic(&conn, 1, false, true);
        add_topic(&conn, 1, true, true);

        let all = subjects_with_progress(&conn, None).expect("load");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].subject.name, "Math");
        assert_eq!(all[0].subject.color, "#3498db");
        assert_eq!(all[0].counts.total_topics, 4);
        assert_eq!(all[0].counts.completed_topics, 2);
        assert_eq!(all[0].counts.weak_topics, 3);
        assert_eq!(all[0].progress, 50.0);
        assert_eq!(all[1].counts, TopicCounts::default());
        assert_eq!(all[1].progress, 0.0);

        let one = subjects_with_progress(&conn, Some(2)).expect("load one");
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].subject.name, "Empty");
        assert!(subjects_with_progress(&conn, Some(99)).expect("load").is_empty());
    }
}
