/// Task query filter
///
/// A [`TaskFilter`] is a conjunction of optional predicates. It is always
/// evaluated on top of a [`TaskScope`], which limits results to the tasks the
/// caller may see; the filter can narrow the scope but never widen it.
///
/// The filter has two realizations that must agree:
///
/// - [`TaskFilter::matches`] for in-memory evaluation
/// - [`TaskFilter::push_predicates`] for SQL, appended to a `QueryBuilder`
///
/// # Predicates
///
/// | Field                                   | Match                       |
/// |-----------------------------------------|-----------------------------|
/// | `title`, `description`                  | case-insensitive substring  |
/// | `completed`, `priority`, `repeat_type`  | equality                    |
/// | `due`, `created`                        | same UTC calendar day       |

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::task::{CompletedStatus, Priority, RepeatType, Task};

/// Default page size for task listings
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page a caller can request
pub const MAX_LIMIT: i64 = 500;

/// Base visibility set of a task query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Personal tasks of the user plus every task in a folder the user owns
    /// or is a member of
    ///
    /// Creating a folder task grants nothing on its own: once the creator
    /// leaves the folder, the task drops out of their scope.
    VisibleTo(Uuid),

    /// Every task in one folder
    Folder(Uuid),
}

impl TaskScope {
    /// Appends the scope predicate, wrapped in parentheses
    pub fn push_predicate(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match *self {
            TaskScope::VisibleTo(user_id) => {
                query.push("((t.folder_id IS NULL AND t.user_id = ");
                query.push_bind(user_id);
                query.push(
                    ") OR EXISTS (SELECT 1 FROM folders f WHERE f.id = t.folder_id AND f.owner_id = ",
                );
                query.push_bind(user_id);
                query.push(
                    ") OR EXISTS (SELECT 1 FROM folder_members m WHERE m.folder_id = t.folder_id AND m.user_id = ",
                );
                query.push_bind(user_id);
                query.push("))");
            }
            TaskScope::Folder(folder_id) => {
                query.push("(t.folder_id = ");
                query.push_bind(folder_id);
                query.push(")");
            }
        }
    }

    /// In-memory scope check
    ///
    /// `visible_folders` holds the folders owned by or shared with the user
    /// of a `VisibleTo` scope; it is ignored for `Folder`.
    pub fn contains(&self, task: &Task, visible_folders: &[Uuid]) -> bool {
        match *self {
            TaskScope::VisibleTo(user_id) => {
                (task.folder_id.is_none() && task.user_id == user_id)
                    || task
                        .folder_id
                        .map_or(false, |folder_id| visible_folders.contains(&folder_id))
            }
            TaskScope::Folder(folder_id) => task.folder_id == Some(folder_id),
        }
    }
}

/// Conjunctive task filter; unset fields are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<CompletedStatus>,
    pub due: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub repeat_type: Option<RepeatType>,
    pub created: Option<NaiveDate>,
}

/// First and last millisecond of a UTC calendar day
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .map(|time| date.and_time(time).and_utc())
        .unwrap_or(start);

    (start, end)
}

fn within_day(value: DateTime<Utc>, date: NaiveDate) -> bool {
    let (start, end) = day_bounds(date);
    value >= start && value <= end
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escapes `LIKE` wildcards so the needle matches literally
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl TaskFilter {
    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        *self == TaskFilter::default()
    }

    /// Evaluates the filter against one task
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(title) = &self.title {
            if !contains_ignore_case(&task.title, title) {
                return false;
            }
        }

        if let Some(description) = &self.description {
            match &task.description {
                Some(text) if contains_ignore_case(text, description) => {}
                _ => return false,
            }
        }

        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }

        if let Some(date) = self.due {
            match task.due {
                Some(due) if within_day(due, date) => {}
                _ => return false,
            }
        }

        if let Some(priority) = self.priority {
            if task.priority != Some(priority) {
                return false;
            }
        }

        if let Some(repeat_type) = self.repeat_type {
            if task.repeat_type != repeat_type {
                return false;
            }
        }

        if let Some(date) = self.created {
            if !within_day(task.created, date) {
                return false;
            }
        }

        true
    }

    /// Appends ` AND ...` for every set predicate
    ///
    /// Expects the scope predicate to have been pushed already.
    pub fn push_predicates(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(title) = &self.title {
            query.push(" AND t.title ILIKE ");
            query.push_bind(like_pattern(title));
        }

        if let Some(description) = &self.description {
            query.push(" AND t.description ILIKE ");
            query.push_bind(like_pattern(description));
        }

        if let Some(completed) = self.completed {
            query.push(" AND t.completed = ");
            query.push_bind(completed);
        }

        if let Some(date) = self.due {
            let (start, end) = day_bounds(date);
            query.push(" AND t.due BETWEEN ");
            query.push_bind(start);
            query.push(" AND ");
            query.push_bind(end);
        }

        if let Some(priority) = self.priority {
            query.push(" AND t.priority = ");
            query.push_bind(priority);
        }

        if let Some(repeat_type) = self.repeat_type {
            query.push(" AND t.repeat_type = ");
            query.push_bind(repeat_type);
        }

        if let Some(date) = self.created {
            let (start, end) = day_bounds(date);
            query.push(" AND t.created BETWEEN ");
            query.push_bind(start);
            query.push(" AND ");
            query.push_bind(end);
        }
    }
}

/// Limit/offset window over an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Builds a page, clamping limit to `1..=MAX_LIMIT` and offset to `>= 0`
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// Applies the window to an already ordered iterator
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
