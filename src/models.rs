use crate::calc::TopicCounts;
use serde::{Deserialize, Deserializer, Serialize};

/// Reads JSON `null` as the type's default, the same as an absent field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectWithProgress {
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(flatten)]
    pub counts: TopicCounts,
    pub progress: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubjectInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
}

/// Empty strings leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubjectPatch {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
    pub is_completed: bool,
    pub is_weak: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTopicInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TopicPatch {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub is_completed: Option<bool>,
    pub is_weak: Option<bool>,
}

impl TopicPatch {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.is_completed.is_none() && self.is_weak.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: i64,
    pub subject_id: i64,
    pub topic_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject_id: i64,
    #[serde(default)]
    pub topic_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

/// `title` is kept when empty; `content` and `topic_id` always overwrite.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotePatch {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    pub topic_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyPlanEntry {
    pub id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_color: String,
    pub study_date: String,
    pub hours_planned: f64,
    pub hours_completed: f64,
    pub notes: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudyPlanInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub study_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hours_planned: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudyPlanPatch {
    pub hours_planned: Option<f64>,
    pub hours_completed: Option<f64>,
    pub notes: Option<String>,
}

impl StudyPlanPatch {
    /// Notes only count when non-empty.
    pub fn notes_value(&self) -> Option<&str> {
        self.notes.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.hours_planned.is_none() && self.hours_completed.is_none() && self.notes_value().is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectProgress {
    pub id: i64,
    pub name: String,
    pub color: String,
    #[serde(flatten)]
    pub counts: TopicCounts,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayPlanItem {
    pub id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_color: String,
    pub hours_planned: f64,
    pub hours_completed: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub days_until_exam: i64,
    pub exam_date: String,
    pub total_subjects: i64,
    #[serde(flatten)]
    pub counts: TopicCounts,
    pub overall_progress: f64,
    pub todays_plan: Vec<TodayPlanItem>,
    pub subject_progress: Vec<SubjectProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn topic_patch_requires_a_field() {
        let p: TopicPatch = serde_json::from_value(json!({})).expect("patch");
        assert!(p.is_empty());
        let p: TopicPatch = serde_json::from_value(json!({ "name": "  " })).expect("patch");
        assert!(p.is_empty());
        let p: TopicPatch = serde_json::from_value(json!({ "is_weak": false })).expect("patch");
        assert!(!p.is_empty());
    }

    #[test]
    fn study_plan_patch_ignores_empty_notes() {
        let p: StudyPlanPatch = serde_json::from_value(json!({ "notes": "" })).expect("patch");
        assert!(p.is_empty());
        let p: StudyPlanPatch =
            serde_json::from_value(json!({ "hours_completed": 0.0 })).expect("patch");
        assert!(!p.is_empty());
        assert_eq!(p.notes_value(), None);
    }

    #[test]
    fn note_patch_defaults_clear_content_and_topic() {
        let p: NotePatch = serde_json::from_value(json!({ "title": "t" })).expect("patch");
        assert_eq!(p.content, "");
        assert_eq!(p.topic_id, None);
    }

    #[test]
    fn null_fields_read_as_unset() {
        let input: CreateStudyPlanInput = serde_json::from_value(json!({
            "subject_id": 1,
            "study_date": "2025-01-01",
            "hours_planned": null,
            "notes": null
        }))
        .expect("input");
        assert_eq!(input.hours_planned, 0.0);
        assert_eq!(input.notes, "");

        let input: CreateSubjectInput =
            serde_json::from_value(json!({ "name": "Math", "description": null, "color": null }))
                .expect("input");
        assert_eq!(input.description, "");
        assert_eq!(input.color, "");

        let input: CreateNoteInput = serde_json::from_value(json!({
            "subject_id": 1,
            "topic_id": null,
            "title": "t",
            "content": null
        }))
        .expect("input");
        assert_eq!(input.content, "");
        assert_eq!(input.topic_id, None);

        let p: NotePatch =
            serde_json::from_value(json!({ "title": null, "content": null })).expect("patch");
        assert_eq!(p.title, "");
    }

    #[test]
    fn subject_progress_flattens_counts() {
        let v = serde_json::to_value(SubjectProgress {
            id: 1,
            name: "Math".into(),
            color: "#3498db".into(),
            counts: TopicCounts {
                total_topics: 2,
                completed_topics: 1,
                weak_topics: 0,
            },
            progress: 50.0,
        })
        .expect("serialize");
        assert_eq!(v["total_topics"], 2);
        assert_eq!(v["completed_topics"], 1);
        assert_eq!(v["progress"], 50.0);
    }
}
