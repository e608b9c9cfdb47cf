use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SUBJECT_COLOR: &str = "#3498db";

/// Timestamp expression shared by column defaults and updates, RFC 3339 UTC with millis.
pub const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const SEED_SUBJECTS: [(&str, &str, &str); 5] = [
    (
        "Flutter",
        "Mobile app development with Flutter framework",
        "#02569B",
    ),
    (
        "Research Methodology",
        "Research methods and academic writing",
        "#9C27B0",
    ),
    ("Linux", "Linux operating system and administration", "#FCC624"),
    ("Oracle", "Oracle database management and SQL", "#F80000"),
    (
        "Microprocessor",
        "Microprocessor architecture and programming",
        "#00897B",
    ),
];

/// Owns the location of the database; every serving context connects through it.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Opens the database once to create the schema and seed default subjects.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let store = Self {
            path: path.to_path_buf(),
        };
        let conn = store.connect()?;
        init_schema(&conn).context("creating tables")?;
        match seed_subjects(&conn) {
            Ok(n) if n > 0 => tracing::info!(count = n, "seeded default subjects"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed to seed subjects"),
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> anyhow::Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        configure(&conn)?;
        Ok(conn)
    }
}

pub fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS subjects(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                color TEXT NOT NULL DEFAULT '{DEFAULT_SUBJECT_COLOR}',
                created_at TEXT NOT NULL DEFAULT ({NOW_SQL})
            )"
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS topics(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                is_weak INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT ({NOW_SQL}),
                FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE
            )"
        ),
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_topics_subject ON topics(subject_id)",
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS notes(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id INTEGER NOT NULL,
                topic_id INTEGER,
                title TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT ({NOW_SQL}),
                updated_at TEXT NOT NULL DEFAULT ({NOW_SQL}),
                FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE,
                FOREIGN KEY(topic_id) REFERENCES topics(id) ON DELETE SET NULL
            )"
        ),
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notes_subject ON notes(subject_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notes_topic ON notes(topic_id)",
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS study_plan(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id INTEGER NOT NULL,
                study_date TEXT NOT NULL,
                hours_planned REAL NOT NULL DEFAULT 1.0,
                hours_completed REAL NOT NULL DEFAULT 0.0,
                notes TEXT,
                created_at TEXT NOT NULL DEFAULT ({NOW_SQL}),
                FOREIGN KEY(subject_id) REFERENCES subjects(id) ON DELETE CASCADE
            )"
        ),
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_study_plan_subject ON study_plan(subject_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_study_plan_date ON study_plan(study_date)",
        [],
    )?;

    Ok(())
}

/// Inserts each default subject whose name is not present yet. Returns how many were added.
pub fn seed_subjects(conn: &Connection) -> rusqlite::Result<usize> {
    let mut added = 0;
    for (name, description, color) in SEED_SUBJECTS {
        let exists = conn
            .query_row("SELECT 1 FROM subjects WHERE name = ?", [name], |_r| Ok(()))
            .optional()?
            .is_some();
        if exists {
            continue;
        }
        conn.execute(
            "INSERT INTO subjects(name, description, color) VALUES(?, ?, ?)",
            (name, description, color),
        )?;
        tracing::debug!(subject = name, "added subject");
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
pub fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    configure(&conn).expect("configure");
    init_schema(&conn).expect("schema");
    conn
}
