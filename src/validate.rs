use crate::errors::{AppError, AppResult};
use crate::models::{Category, Priority, TodoPatch, TodoPayload};
use serde_json::Value;

/// Normalize a candidate record. On create (`is_update` false) `title` must
/// be present; on update every field is optional and absent fields are left
/// absent rather than synthesized.
pub fn validate(payload: &TodoPayload, is_update: bool) -> AppResult<TodoPatch> {
    if !is_update && payload.title.is_none() {
        return Err(AppError::Validation(
            "Missing required field: title".to_string(),
        ));
    }

    Ok(TodoPatch {
        title: payload.title.clone(),
        completed: payload.completed.as_ref().map(json_truthy),
        progress: payload.progress.as_ref().map(coerce_progress),
        category: payload.category.as_deref().map(Category::coerce),
        priority: payload.priority.as_deref().map(Priority::coerce),
        due_date: payload.due_date.clone(),
        description: payload.description.clone(),
    })
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Integer coercion with clamping; non-coercible input becomes 0.
fn coerce_progress(value: &Value) -> u8 {
    let raw = match value {
        Value::Bool(flag) => i64::from(*flag),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n as i64))
            .unwrap_or(0),
        Value::String(text) => text.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    raw.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_requires_title() {
        let error = validate(&TodoPayload::default(), false).expect_err("title is required");
        assert!(error.to_string().contains("title"));
    }

    #[test]
    fn update_allows_fully_empty_payload() {
        let patch = validate(&TodoPayload::default(), true).expect("empty update payload");
        assert_eq!(patch, TodoPatch::default());
    }

    #[test]
    fn progress_is_clamped_for_any_input_shape() {
        let cases = [
            (json!(150), 100),
            (json!(-5), 0),
            (json!(42), 42),
            (json!(3.7), 3),
            (json!("42"), 42),
            (json!("  7 "), 7),
            (json!("not a number"), 0),
            (json!(null), 0),
            (json!(true), 1),
            (json!([1, 2]), 0),
        ];
        for (input, expected) in cases {
            let payload = TodoPayload {
                progress: Some(input.clone()),
                ..TodoPayload::default()
            };
            let patch = validate(&payload, true).expect("progress normalizes");
            assert_eq!(patch.progress, Some(expected), "input {input}");
        }
    }

    #[test]
    fn completed_follows_json_truthiness() {
        let cases = [
            (json!(true), true),
            (json!(false), false),
            (json!(null), false),
            (json!(0), false),
            (json!(1), true),
            (json!(""), false),
            (json!("yes"), true),
        ];
        for (input, expected) in cases {
            let payload = TodoPayload {
                completed: Some(input.clone()),
                ..TodoPayload::default()
            };
            let patch = validate(&payload, true).expect("completed normalizes");
            assert_eq!(patch.completed, Some(expected), "input {input}");
        }
    }

    #[test]
    fn category_and_priority_coerce_into_fixed_sets() {
        let payload = TodoPayload {
            title: Some("todo".to_string()),
            category: Some("".to_string()),
            priority: Some("urgent".to_string()),
            ..TodoPayload::default()
        };
        let patch = validate(&payload, false).expect("coercions apply");
        assert_eq!(patch.category, Some(Category::Other));
        assert_eq!(patch.priority, Some(Priority::Low));
    }

    #[test]
    fn absent_fields_are_not_synthesized_on_update() {
        let payload = TodoPayload {
            description: Some("only this".to_string()),
            ..TodoPayload::default()
        };
        let patch = validate(&payload, true).expect("partial update");
        assert!(patch.title.is_none());
        assert!(patch.completed.is_none());
        assert!(patch.progress.is_none());
        assert_eq!(patch.description.as_deref(), Some("only this"));
    }
}
