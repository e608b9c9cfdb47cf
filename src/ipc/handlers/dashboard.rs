use crate::calc::{days_until_exam, TopicCounts};
use crate::ipc::error::{ApiError, Reply};
use crate::ipc::handlers::study_plan::entries_on;
use crate::ipc::handlers::subjects::subjects_with_progress;
use crate::ipc::helpers::today;
use crate::ipc::router::Route;
use crate::ipc::types::{AppState, Request};
use crate::models::{Dashboard, SubjectProgress, TodayPlanItem};
use chrono::Local;
use rusqlite::Connection;

pub fn subject_progress(conn: &Connection) -> rusqlite::Result<Vec<SubjectProgress>> {
    let subjects = subjects_with_progress(conn, None)?;
    Ok(subjects
        .into_iter()
        .map(|s| SubjectProgress {
            id: s.subject.id,
            name: s.subject.name,
            color: s.subject.color,
            counts: s.counts,
            progress: s.progress,
        })
        .collect())
}

fn topic_totals(conn: &Connection) -> rusqlite::Result<TopicCounts> {
    conn.query_row(
        "SELECT
           COUNT(*),
           COALESCE(SUM(CASE WHEN is_completed THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(CASE WHEN is_weak THEN 1 ELSE 0 END), 0)
         FROM topics",
        [],
        |r| {
            Ok(TopicCounts {
                total_topics: r.get(0)?,
                completed_topics: r.get(1)?,
                weak_topics: r.get(2)?,
            })
        },
    )
}

fn handle_dashboard(state: &AppState) -> Result<Reply, ApiError> {
    let conn = &state.db;
    let total_subjects: i64 = conn.query_row("SELECT COUNT(*) FROM subjects", [], |r| r.get(0))?;
    let counts = topic_totals(conn)?;

    let todays_plan = entries_on(conn, &today())?
        .into_iter()
        .map(|e| TodayPlanItem {
            id: e.id,
            subject_id: e.subject_id,
            subject_name: e.subject_name,
            subject_color: e.subject_color,
            hours_planned: e.hours_planned,
            hours_completed: e.hours_completed,
            notes: e.notes,
        })
        .collect();

    let dashboard = Dashboard {
        days_until_exam: days_until_exam(state.config.exam_date, Local::now().naive_local()),
        exam_date: state.config.exam_date_raw.clone(),
        total_subjects,
        overall_progress: counts.progress(),
        counts,
        todays_plan,
        subject_progress: subject_progress(conn)?,
    };
    Reply::ok("Dashboard data retrieved", dashboard)
}

fn handle_progress(state: &AppState) -> Result<Reply, ApiError> {
    Reply::ok("Progress data retrieved", subject_progress(&state.db)?)
}

pub fn try_handle(
    state: &AppState,
    _req: &Request,
    route: &Route,
) -> Option<Result<Reply, ApiError>> {
    match (route.method.as_str(), route.segments.as_slice()) {
        ("GET", ["dashboard"]) => Some(handle_dashboard(state)),
        ("GET", ["progress"]) => Some(handle_progress(state)),
        _ => None,
    }
}
