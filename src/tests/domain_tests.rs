//! Domain-level tests: aggregates, patches, errors, pagination, wire shapes.

use super::support::{at, phase_record, task_record};
use crate::domain::{
    ApiError, DomainError, PageRequest, Phase, PhasePatch, PhaseView, PhaseWithTasks, SortDir,
    SortField, Task, TaskPatch, TaskSummary,
};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn phase_new_starts_open_with_matching_timestamps() {
    let phase = Phase::new("Design", &DefaultClock).expect("valid phase");

    assert_eq!(phase.name(), "Design");
    assert!(!phase.is_done());
    assert_eq!(phase.created_on(), phase.updated_on());
}

#[rstest]
#[case("")]
#[case("   ")]
fn phase_new_rejects_blank_name(#[case] name: &str) {
    assert_eq!(
        Phase::new(name, &DefaultClock),
        Err(DomainError::EmptyPhaseName)
    );
}

#[rstest]
#[case("")]
#[case("\t")]
fn task_new_rejects_blank_name(#[case] name: &str) {
    let phase = phase_record("Design", false, at(0));
    assert_eq!(
        Task::new(phase.id(), name, &DefaultClock),
        Err(DomainError::EmptyTaskName)
    );
}

#[rstest]
fn phase_apply_patches_fields_and_refreshes_timestamp() {
    let mut phase = phase_record("Design", false, at(0));
    let patch = PhasePatch {
        name: Some("Implementation".to_owned()),
        done: Some(true),
        updated_on: at(30),
    };

    phase.apply(&patch);

    assert_eq!(phase.name(), "Implementation");
    assert!(phase.is_done());
    assert_eq!(phase.created_on(), at(0));
    assert_eq!(phase.updated_on(), at(30));
}

#[rstest]
fn task_apply_with_name_only_leaves_done_untouched() {
    let phase = phase_record("Design", false, at(0));
    let mut task = task_record(phase.id(), "Sketch", true, at(1));
    let patch = TaskPatch {
        name: Some("Wireframe".to_owned()),
        done: None,
        updated_on: at(5),
    };

    task.apply(&patch);

    assert_eq!(task.name(), "Wireframe");
    assert!(task.is_done());
    assert_eq!(task.updated_on(), at(5));
}

#[rstest]
#[case(ApiError::bad_request("boom"), 400)]
#[case(ApiError::Forbidden, 403)]
#[case(ApiError::NotFound, 404)]
#[case(ApiError::conflict("taken"), 409)]
#[case(ApiError::Internal, 500)]
fn api_error_maps_to_status_code(#[case] error: ApiError, #[case] expected: u16) {
    assert_eq!(error.status_code(), expected);
}

#[rstest]
fn api_error_details_only_for_carrying_kinds() {
    assert_eq!(
        ApiError::bad_request("missing phase").details(),
        ["missing phase".to_owned()]
    );
    assert!(ApiError::NotFound.details().is_empty());
    assert!(ApiError::Forbidden.details().is_empty());
}

#[rstest]
fn domain_error_converts_to_bad_request() {
    let error: ApiError = DomainError::EmptyPhaseName.into();
    assert_eq!(
        error,
        ApiError::bad_request("phase name must not be empty")
    );
}

#[rstest]
#[case(0, 10, 0)]
#[case(1, 10, 1)]
#[case(10, 10, 1)]
#[case(11, 10, 2)]
#[case(5, 0, 5)]
fn total_pages_rounds_up(#[case] rows: usize, #[case] page_size: usize, #[case] expected: usize) {
    let page = PageRequest::new(0, page_size);
    assert_eq!(page.total_pages(rows), expected);
}

#[rstest]
fn page_request_single_probes_one_row() {
    let page = PageRequest::single();
    assert_eq!(page.page, 0);
    assert_eq!(page.page_size, 1);
    assert!(page.sort.is_empty());
}

#[rstest]
fn page_request_offset_skips_full_pages() {
    assert_eq!(PageRequest::new(3, 25).offset(), 75);
}

#[rstest]
fn sort_direction_defaults_to_descending() {
    assert_eq!(PageRequest::default().sort_direction(), SortDir::Desc);
}

#[rstest]
#[case("name", SortField::Name)]
#[case("done", SortField::Done)]
#[case("createdOn", SortField::CreatedOn)]
#[case("created_on", SortField::CreatedOn)]
#[case("updatedOn", SortField::UpdatedOn)]
fn sort_field_parses_known_keys(#[case] raw: &str, #[case] expected: SortField) {
    assert_eq!(SortField::parse(raw), Ok(expected));
}

#[rstest]
fn sort_field_rejects_unknown_key() {
    assert_eq!(
        SortField::parse("priority"),
        Err(ApiError::bad_request("unknown sort field priority"))
    );
}

#[rstest]
fn phase_serializes_with_wire_casing() {
    let phase = phase_record("Design", false, at(0));
    let value = serde_json::to_value(&phase).expect("serializable phase");

    assert_eq!(value.get("name"), Some(&json!("Design")));
    assert_eq!(value.get("done"), Some(&json!(false)));
    assert!(value.get("createdOn").is_some());
    assert!(value.get("updatedOn").is_some());
    assert!(value.get("created_on").is_none());
}

#[rstest]
fn phase_with_tasks_flattens_and_strips_phase_reference() {
    let phase = phase_record("Design", false, at(0));
    let task = task_record(phase.id(), "Sketch", false, at(1));
    let detail = PhaseWithTasks::new(phase, vec![TaskSummary::from(&task)]);
    let value = serde_json::to_value(&detail).expect("serializable projection");

    assert_eq!(value.get("name"), Some(&json!("Design")));
    let tasks = value
        .get("tasks")
        .and_then(serde_json::Value::as_array)
        .expect("tasks array");
    assert_eq!(tasks.len(), 1);
    let first = tasks.first().expect("one task");
    assert_eq!(first.get("name"), Some(&json!("Sketch")));
    assert!(first.get("phaseId").is_none());
}

#[rstest]
fn phase_view_serializes_untagged() {
    let phase = phase_record("Design", false, at(0));
    let raw = serde_json::to_value(&PhaseView::Raw(phase.clone())).expect("serializable view");
    let detail = serde_json::to_value(&PhaseView::WithTasks(PhaseWithTasks::new(
        phase,
        Vec::new(),
    )))
    .expect("serializable view");

    assert!(raw.get("tasks").is_none());
    assert_eq!(detail.get("tasks"), Some(&json!([])));
}

#[rstest]
fn phase_view_exposes_record_in_both_projections() {
    let phase = phase_record("Design", false, at(0));
    let raw = PhaseView::Raw(phase.clone());
    let detail = PhaseView::WithTasks(PhaseWithTasks::new(phase.clone(), Vec::new()));

    assert_eq!(raw.phase().id(), phase.id());
    assert_eq!(detail.phase().id(), phase.id());
    assert!(raw.tasks().is_none());
    assert_eq!(detail.tasks(), Some(&[][..]));
}

#[rstest]
fn all_tasks_done_requires_every_task() {
    let phase = phase_record("Design", false, at(0));
    let done = TaskSummary::from(&task_record(phase.id(), "a", true, at(1)));
    let open = TaskSummary::from(&task_record(phase.id(), "b", false, at(2)));

    assert!(PhaseWithTasks::new(phase.clone(), vec![done.clone()]).all_tasks_done());
    assert!(!PhaseWithTasks::new(phase.clone(), vec![done, open]).all_tasks_done());
    assert!(PhaseWithTasks::new(phase, Vec::new()).all_tasks_done());
}
