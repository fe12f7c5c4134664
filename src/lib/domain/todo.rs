use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A stored todo item. `id` is always assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Body of `POST /todos`. Any `id` sent by the client is dropped on the floor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Body of `PUT /todos/{id}`. Only fields present in the payload are applied.
///
/// `description` distinguishes "absent" (`None`) from an explicit `null`
/// (`Some(None)`), the latter clearing the stored description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

// Only called when the key exists, so a `null` value becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_todo_defaults_and_ignores_id() {
        let new: NewTodo = serde_json::from_str(r#"{"id": 42, "title": "Buy milk"}"#).unwrap();
        assert_eq!(new.title, "Buy milk");
        assert_eq!(new.description, None);
        assert!(!new.completed);
    }

    #[test]
    fn new_todo_requires_title() {
        assert!(serde_json::from_str::<NewTodo>(r#"{"completed": true}"#).is_err());
    }

    #[test]
    fn patch_leaves_absent_fields_alone() {
        let patch: TodoPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(patch.completed, Some(true));
        assert_eq!(patch.title, None);
        assert_eq!(patch.description, None);
    }

    #[test]
    fn patch_tracks_explicit_description() {
        let patch: TodoPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert!(!patch.is_empty());

        let patch: TodoPatch = serde_json::from_str(r#"{"description": "2 litres"}"#).unwrap();
        assert_eq!(patch.description, Some(Some("2 litres".to_string())));
    }

    #[test]
    fn empty_patch() {
        let patch: TodoPatch = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn todo_serializes_null_description() {
        let todo = Todo {
            id: 1,
            title: "Buy milk".into(),
            description: None,
            completed: false,
        };
        assert_eq!(
            serde_json::to_value(&todo).unwrap(),
            serde_json::json!({"id": 1, "title": "Buy milk", "description": null, "completed": false})
        );
    }
}
