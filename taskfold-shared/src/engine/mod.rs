/// Core task logic
///
/// Store-independent rules for tasks and memberships:
///
/// - `mutation`: create validation, patch validation, apply and rollover
/// - `recurrence`: repeat interval arithmetic
/// - `filter`: task query predicates, visibility scope and paging
/// - `membership`: role assignment rules for folder members

pub mod filter;
pub mod membership;
pub mod mutation;
pub mod recurrence;
