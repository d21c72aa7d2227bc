//! Property tests for the task model.
//!
//! Uses proptest to verify:
//! 1. A status move is accepted iff the target is in the source's table row.
//! 2. Any task survives a JSON encode -> decode round trip.
//! 3. Applying a patch changes exactly the fields the patch names.
//! 4. Arbitrary JSON never panics the task decoder.

use chrono::NaiveDate;
use proptest::prelude::*;
use taskboard_proto::task::MAX_TASK_TITLE_LENGTH;
use taskboard_proto::{
    Category, Description, Priority, Status, TRANSITIONS, Task, TaskId, TaskPatch,
    TransitionError, check_transition,
};

fn arb_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_filter_map("valid date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

fn arb_description() -> impl Strategy<Value = Description> {
    (
        ".{0,40}",
        ".{0,80}",
        prop::collection::vec(".{1,20}", 0..4),
        ".{0,40}",
    )
        .prop_map(|(summary, details, acceptance_criteria, notes)| Description {
            summary,
            details,
            acceptance_criteria,
            notes,
        })
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        1i64..100_000,
        "[a-zA-Z0-9 ]{1,64}",
        arb_category(),
        arb_priority(),
        arb_status(),
        arb_date(),
        arb_description(),
    )
        .prop_map(
            |(id, title, category, priority, status, duedate, description)| Task {
                id: TaskId::new(id),
                title,
                category,
                priority,
                status,
                duedate,
                description,
            },
        )
}

fn arb_patch() -> impl Strategy<Value = TaskPatch> {
    (
        prop::option::of("[a-z]{1,20}"),
        prop::option::of(arb_category()),
        prop::option::of(arb_priority()),
        prop::option::of(arb_status()),
        prop::option::of(arb_date()),
    )
        .prop_map(|(title, category, priority, status, duedate)| TaskPatch {
            title,
            category,
            priority,
            status,
            duedate,
            ..TaskPatch::default()
        })
}

fn table_allows(from: Status, to: Status) -> bool {
    TRANSITIONS
        .iter()
        .any(|(source, targets)| *source == from && targets.contains(&to))
}

proptest! {
    #[test]
    fn transition_accepted_iff_in_table(from in arb_status(), to in arb_status()) {
        let result = check_transition(from, to);
        if from == to {
            prop_assert_eq!(result, Err(TransitionError::Unchanged(from)));
        } else if table_allows(from, to) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(TransitionError::NotAllowed { from, to }));
        }
    }

    #[test]
    fn task_json_round_trip(task in arb_task()) {
        let json = serde_json::to_string(&task).unwrap();
        let decoded: Task = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(task, decoded);
    }

    #[test]
    fn patch_touches_only_named_fields(task in arb_task(), patch in arb_patch()) {
        let after = task.patched(&patch);
        prop_assert_eq!(after.id, task.id);
        prop_assert_eq!(&after.title, patch.title.as_ref().unwrap_or(&task.title));
        prop_assert_eq!(after.category, patch.category.unwrap_or(task.category));
        prop_assert_eq!(after.priority, patch.priority.unwrap_or(task.priority));
        prop_assert_eq!(after.status, patch.status.unwrap_or(task.status));
        prop_assert_eq!(after.duedate, patch.duedate.unwrap_or(task.duedate));
        prop_assert_eq!(&after.description, &task.description);
    }

    #[test]
    fn patch_validation_accepts_short_titles(title in "[a-z]{1,64}") {
        let patch = TaskPatch { title: Some(title), ..TaskPatch::default() };
        prop_assert!(patch.validate(TaskId::new(1)).is_ok());
    }

    #[test]
    fn patch_validation_rejects_long_titles(extra in 1usize..50) {
        let patch = TaskPatch {
            title: Some("t".repeat(MAX_TASK_TITLE_LENGTH + extra)),
            ..TaskPatch::default()
        };
        prop_assert!(patch.validate(TaskId::new(1)).is_err());
    }

    #[test]
    fn random_json_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = serde_json::from_slice::<Task>(&bytes);
        let _ = serde_json::from_slice::<TaskPatch>(&bytes);
    }
}
