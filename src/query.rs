use crate::models::{Category, ListFilters, Priority, Todo, TodoStats};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Records without a due date sort after every real one.
const FAR_FUTURE_DUE_DATE: &str = "9999-12-31";

/// Apply the independent, composable list filters in place. Unrecognized
/// status values and empty-string filter values are ignored.
pub fn apply_filters(todos: &mut Vec<Todo>, filters: &ListFilters) {
    match filters.status.as_deref() {
        Some("active") => todos.retain(|todo| !todo.completed),
        Some("completed") => todos.retain(|todo| todo.completed),
        _ => {}
    }

    if let Some(category) = non_empty(filters.category.as_deref()) {
        todos.retain(|todo| {
            todo.category
                .map(|value| value.as_str() == category)
                .unwrap_or(false)
        });
    }

    if let Some(priority) = non_empty(filters.priority.as_deref()) {
        todos.retain(|todo| {
            todo.priority
                .map(|value| value.as_str() == priority)
                .unwrap_or(false)
        });
    }

    if non_empty(filters.due_date.as_deref()).is_some() {
        let today = Utc::now().date_naive();
        todos.retain(|todo| {
            todo.due_date
                .as_deref()
                .and_then(parse_due_date)
                .map(|date| date == today)
                .unwrap_or(false)
        });
    }
}

/// Stable sort; no sort key preserves collection order.
pub fn sort_todos(todos: &mut [Todo], sort: Option<&str>) {
    match sort {
        Some("due_date") => todos.sort_by(|a, b| due_date_key(a).cmp(due_date_key(b))),
        Some("priority") => {
            todos.sort_by_key(|todo| todo.priority.map(Priority::rank).unwrap_or(Priority::Low.rank()))
        }
        Some("created") => todos.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        _ => {}
    }
}

fn due_date_key(todo: &Todo) -> &str {
    todo.due_date.as_deref().unwrap_or(FAR_FUTURE_DUE_DATE)
}

/// Case-insensitive substring match on title or description. The empty
/// query short-circuits to an empty result set.
pub fn search(todos: &[Todo], query: &str) -> Vec<Todo> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    todos
        .iter()
        .filter(|todo| {
            todo.title.to_lowercase().contains(&needle)
                || todo
                    .description
                    .as_deref()
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

pub fn collect_stats(todos: &[Todo]) -> TodoStats {
    let now = Utc::now();
    let mut stats = TodoStats {
        total: todos.len(),
        ..TodoStats::default()
    };

    for todo in todos {
        if todo.completed {
            stats.completed += 1;
        } else {
            stats.active += 1;
            let past_due = todo
                .due_date
                .as_deref()
                .and_then(parse_due_moment)
                .map(|due| due < now)
                .unwrap_or(false);
            if past_due {
                stats.overdue += 1;
            }
        }

        match todo.priority {
            Some(Priority::High) => stats.by_priority.high += 1,
            Some(Priority::Medium) => stats.by_priority.medium += 1,
            Some(Priority::Low) => stats.by_priority.low += 1,
            None => {}
        }

        match todo.category {
            Some(Category::Work) => stats.by_category.work += 1,
            Some(Category::Personal) => stats.by_category.personal += 1,
            Some(Category::Shopping) => stats.by_category.shopping += 1,
            Some(Category::Study) => stats.by_category.study += 1,
            Some(Category::Other) => stats.by_category.other += 1,
            None => {}
        }
    }

    stats
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

/// Tolerant timestamp parse: RFC 3339, naive datetime, or bare date.
fn parse_due_moment(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    parse_due_moment(raw).map(|moment| moment.date_naive())
}
