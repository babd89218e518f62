/// Task mutation engine
///
/// Pure functions that turn client input into validated task state. Nothing
/// here touches the store or checks roles: callers authorize first (see
/// [`crate::service`]) and run [`apply_update`] inside the store's
/// per-record transaction.
///
/// # Update phases
///
/// 1. [`TaskPatch::validate`]: nullability of protected fields, blank title,
///    repeat amount range. Needs only the payload.
/// 2. [`ValidatedPatch::check_against`]: repeat/due invariant on the merged
///    (incoming over stored) values.
/// 3. [`ValidatedPatch::apply_to`]: field-by-field overwrite.
/// 4. [`rollover`]: a repeating task marked `true` gets its due date advanced
///    by one interval and is reopened.
///
/// Phases 2–4 are combined by [`apply_update`], which works on an owned copy
/// so a failure leaves the stored task untouched.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::engine::recurrence::add_interval;
use crate::error::{CoreError, CoreResult};
use crate::models::task::{
    CompletedStatus, CreateTask, NewTask, Priority, RepeatType, Task, TaskPatch,
};

const DUE_REQUIRED: &str = "due date is required to repeat tasks";

/// Validates a create payload into insert data
///
/// `created` is server-assigned and `user_id`/`folder_id` come from the
/// request scope, never from the payload.
pub fn prepare_create(
    input: NewTask,
    user_id: Uuid,
    folder_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> CoreResult<CreateTask> {
    let title = input
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CoreError::validation("title required"))?;

    let repeat_type = input.repeat_type.unwrap_or_default();
    let repeat_amount = input.repeat_amount.unwrap_or(1);

    if repeat_amount < 1 {
        return Err(CoreError::validation("repeat_amount must be at least 1"));
    }

    if repeat_type.is_repeating() && input.due.is_none() {
        return Err(CoreError::validation(DUE_REQUIRED));
    }

    Ok(CreateTask {
        title,
        description: input.description,
        completed: input.completed.unwrap_or_default(),
        due: input.due,
        priority: input.priority,
        repeat_type,
        repeat_amount,
        created: now,
        user_id,
        folder_id,
    })
}

/// A patch whose protected fields are known to be non-null
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<CompletedStatus>,
    pub due: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Option<Priority>>,
    pub repeat_type: Option<RepeatType>,
    pub repeat_amount: Option<i32>,
}

fn not_null<T>(field: &str, value: Option<Option<T>>) -> CoreResult<Option<T>> {
    match value {
        None => Ok(None),
        Some(Some(v)) => Ok(Some(v)),
        Some(None) => Err(CoreError::validation(format!("{} cannot be null", field))),
    }
}

impl TaskPatch {
    /// Rejects nulls in `title`, `completed`, `repeat_type` and `repeat_amount`
    ///
    /// The first violation aborts the whole update.
    pub fn validate(self) -> CoreResult<ValidatedPatch> {
        let title = not_null("title", self.title)?
            .map(|t| t.trim().to_string());

        if matches!(title.as_deref(), Some("")) {
            return Err(CoreError::validation("title cannot be empty"));
        }

        let completed = not_null("completed", self.completed)?;
        let repeat_type = not_null("repeat_type", self.repeat_type)?;
        let repeat_amount = not_null("repeat_amount", self.repeat_amount)?;

        if matches!(repeat_amount, Some(amount) if amount < 1) {
            return Err(CoreError::validation("repeat_amount must be at least 1"));
        }

        Ok(ValidatedPatch {
            title,
            description: self.description,
            completed,
            due: self.due,
            priority: self.priority,
            repeat_type,
            repeat_amount,
        })
    }
}

impl ValidatedPatch {
    /// True when the patch carries no field at all
    pub fn is_empty(&self) -> bool {
        *self == ValidatedPatch::default()
    }

    /// Checks the repeat/due invariant on the values the task would have
    ///
    /// An incoming value wins over the stored one, including an explicit
    /// null due date.
    pub fn check_against(&self, current: &Task) -> CoreResult<()> {
        let repeat_type = self.repeat_type.unwrap_or(current.repeat_type);
        let due = match self.due {
            Some(due) => due,
            None => current.due,
        };

        if repeat_type.is_repeating() && due.is_none() {
            return Err(CoreError::validation(DUE_REQUIRED));
        }

        Ok(())
    }

    /// Overwrites every field present in the patch
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due) = self.due {
            task.due = due;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(repeat_type) = self.repeat_type {
            task.repeat_type = repeat_type;
        }
        if let Some(repeat_amount) = self.repeat_amount {
            task.repeat_amount = repeat_amount;
        }
    }
}

/// Reschedules a completed repeating task
///
/// Returns true if the task was rolled over.
pub fn rollover(task: &mut Task) -> CoreResult<bool> {
    if task.completed != CompletedStatus::True || !task.repeat_type.is_repeating() {
        return Ok(false);
    }

    let due = task
        .due
        .ok_or_else(|| CoreError::validation(DUE_REQUIRED))?;

    let next = add_interval(due, task.repeat_type, task.repeat_amount)?;

    debug!(
        task_id = %task.id,
        repeat_type = task.repeat_type.as_str(),
        repeat_amount = task.repeat_amount,
        from = %due,
        to = %next,
        "Rolling over repeating task"
    );

    task.due = Some(next);
    task.completed = CompletedStatus::False;

    Ok(true)
}

/// Runs invariant check, field application and rollover on a task
///
/// Consumes the stored copy and returns the new state; on error the caller
/// discards everything.
pub fn apply_update(current: Task, patch: ValidatedPatch) -> CoreResult<Task> {
    patch.check_against(&current)?;

    let mut task = current;
    patch.apply_to(&mut task);
    rollover(&mut task)?;

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn task(repeat_type: RepeatType, due_at: Option<DateTime<Utc>>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Ship".to_string(),
            description: Some("release notes".to_string()),
            completed: CompletedStatus::False,
            due: due_at,
            priority: Some(Priority::High),
            repeat_type,
            repeat_amount: 1,
            created: due(2024, 1, 1),
            user_id: Uuid::new_v4(),
            folder_id: None,
        }
    }

    fn patch(json: &str) -> TaskPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_prepare_create_defaults() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let data = prepare_create(
            NewTask {
                title: Some("  Ship  ".to_string()),
                ..Default::default()
            },
            user_id,
            None,
            now,
        )
        .unwrap();

        assert_eq!(data.title, "Ship");
        assert_eq!(data.completed, CompletedStatus::False);
        assert_eq!(data.repeat_type, RepeatType::Never);
        assert_eq!(data.repeat_amount, 1);
        assert_eq!(data.created, now);
        assert_eq!(data.user_id, user_id);
    }

    #[test]
    fn test_prepare_create_requires_title() {
        for title in [None, Some(String::new()), Some("   ".to_string())] {
            let result = prepare_create(
                NewTask { title, ..Default::default() },
                Uuid::new_v4(),
                None,
                Utc::now(),
            );
            match result {
                Err(CoreError::Validation(msg)) => assert_eq!(msg, "title required"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_prepare_create_repeat_requires_due() {
        let result = prepare_create(
            NewTask {
                title: Some("Ship".to_string()),
                repeat_type: Some(RepeatType::Weekly),
                ..Default::default()
            },
            Uuid::new_v4(),
            None,
            Utc::now(),
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));

        let result = prepare_create(
            NewTask {
                title: Some("Ship".to_string()),
                repeat_type: Some(RepeatType::Never),
                ..Default::default()
            },
            Uuid::new_v4(),
            None,
            Utc::now(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_prepare_create_rejects_zero_amount() {
        let result = prepare_create(
            NewTask {
                title: Some("Ship".to_string()),
                repeat_amount: Some(0),
                ..Default::default()
            },
            Uuid::new_v4(),
            None,
            Utc::now(),
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_null_protected_fields() {
        for field in ["title", "completed", "repeat_type", "repeat_amount"] {
            let json = format!(r#"{{"{}": null}}"#, field);
            match patch(&json).validate() {
                Err(CoreError::Validation(msg)) => {
                    assert_eq!(msg, format!("{} cannot be null", field))
                }
                other => panic!("expected validation error for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_validate_allows_null_optional_fields() {
        let validated = patch(r#"{"description": null, "priority": null, "due": null}"#)
            .validate()
            .unwrap();

        assert_eq!(validated.description, Some(None));
        assert_eq!(validated.priority, Some(None));
        assert_eq!(validated.due, Some(None));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        assert!(patch(r#"{"title": "  "}"#).validate().is_err());
    }

    #[test]
    fn test_empty_patch() {
        assert!(patch("{}").validate().unwrap().is_empty());
        assert!(!patch(r#"{"priority": "low"}"#).validate().unwrap().is_empty());
    }

    #[test]
    fn test_incoming_repeat_without_due_rejected() {
        let current = task(RepeatType::Never, Some(due(2024, 3, 1)));
        let validated = patch(r#"{"repeat_type": "daily", "due": null}"#)
            .validate()
            .unwrap();

        assert!(matches!(
            apply_update(current, validated),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_repeat_on_task_without_due_rejected() {
        let current = task(RepeatType::Never, None);
        let validated = patch(r#"{"repeat_type": "monthly"}"#).validate().unwrap();

        assert!(apply_update(current, validated).is_err());
    }

    #[test]
    fn test_clearing_due_of_repeating_task_rejected() {
        let current = task(RepeatType::Weekly, Some(due(2024, 3, 1)));
        let validated = patch(r#"{"due": null}"#).validate().unwrap();

        assert!(apply_update(current, validated).is_err());
    }

    #[test]
    fn test_apply_overwrites_present_fields_only() {
        let current = task(RepeatType::Never, None);
        let validated = patch(r#"{"title": "Review", "description": null, "completed": "in_progress"}"#)
            .validate()
            .unwrap();

        let updated = apply_update(current.clone(), validated).unwrap();

        assert_eq!(updated.title, "Review");
        assert_eq!(updated.description, None);
        assert_eq!(updated.completed, CompletedStatus::InProgress);
        assert_eq!(updated.priority, current.priority);
        assert_eq!(updated.created, current.created);
        assert_eq!(updated.id, current.id);
    }

    #[test]
    fn test_completing_repeating_task_rolls_over() {
        let current = task(RepeatType::Weekly, Some(due(2024, 3, 1)));
        let validated = patch(r#"{"completed": "true"}"#).validate().unwrap();

        let updated = apply_update(current, validated).unwrap();

        assert_eq!(updated.completed, CompletedStatus::False);
        assert_eq!(updated.due, Some(due(2024, 3, 8)));
    }

    #[test]
    fn test_rollover_uses_incoming_repeat_settings() {
        let current = task(RepeatType::Never, Some(due(2024, 1, 31)));
        let validated = patch(r#"{"completed": "true", "repeat_type": "monthly", "repeat_amount": 1}"#)
            .validate()
            .unwrap();

        let updated = apply_update(current, validated).unwrap();

        assert_eq!(updated.completed, CompletedStatus::False);
        assert_eq!(updated.due, Some(due(2024, 2, 29)));
    }

    #[test]
    fn test_rollover_uses_incoming_due() {
        let current = task(RepeatType::Daily, Some(due(2024, 3, 1)));
        let validated = patch(r#"{"completed": "true", "due": "2024-05-10T12:00:00Z"}"#)
            .validate()
            .unwrap();

        let updated = apply_update(current, validated).unwrap();
        assert_eq!(updated.due, Some(due(2024, 5, 11)));
    }

    #[test]
    fn test_completing_one_off_task_stays_done() {
        let current = task(RepeatType::Never, Some(due(2024, 3, 1)));
        let validated = patch(r#"{"completed": "true"}"#).validate().unwrap();

        let updated = apply_update(current, validated).unwrap();

        assert_eq!(updated.completed, CompletedStatus::True);
        assert_eq!(updated.due, Some(due(2024, 3, 1)));
    }

    #[test]
    fn test_in_progress_does_not_roll_over() {
        let mut current = task(RepeatType::Daily, Some(due(2024, 3, 1)));
        current.completed = CompletedStatus::InProgress;

        assert!(!rollover(&mut current).unwrap());
        assert_eq!(current.due, Some(due(2024, 3, 1)));
    }

    #[test]
    fn test_rollover_with_amount() {
        let mut current = task(RepeatType::Daily, Some(due(2024, 3, 1)));
        current.repeat_amount = 3;
        current.completed = CompletedStatus::True;

        assert!(rollover(&mut current).unwrap());
        assert_eq!(current.due, Some(due(2024, 3, 4)));
        assert_eq!(current.completed, CompletedStatus::False);
    }
}
