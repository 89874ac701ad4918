//! Service tests for the task lifecycle workflow and the phase cascade.

use super::support::{Harness, at, harness, phase_record, task_record};
use crate::domain::{ApiError, PageRequest, PhaseId, TaskId};
use crate::ports::{PhaseRepository, TaskFilters, TaskRepository};
use crate::services::{PhaseEdit, TaskEdit};
use rstest::rstest;

async fn phase_is_done(harness: &Harness, id: PhaseId) -> bool {
    harness
        .phase_service
        .get_phase_by_id(id, None)
        .await
        .expect("phase lookup should succeed")
        .phase()
        .is_done()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_requires_existing_phase(harness: Harness) {
    let result = harness
        .task_service
        .create_task(PhaseId::new(), "Sketch")
        .await;
    assert_eq!(
        result,
        Err(ApiError::bad_request("related phase does not exist"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_starts_open_and_round_trips(harness: Harness) {
    let phase = harness
        .phase_service
        .create_phase("Design")
        .await
        .expect("phase creation should succeed");

    let created = harness
        .task_service
        .create_task(phase.id(), "Sketch")
        .await
        .expect("task creation should succeed");

    assert_eq!(created.name(), "Sketch");
    assert_eq!(created.phase_id(), phase.id());
    assert!(!created.is_done());

    let fetched = harness
        .task_service
        .get_task_by_id(created.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched, created);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_reopens_completed_phase(harness: Harness) {
    let phase = phase_record("Design", true, at(0));
    harness.phases.insert(&phase).await.expect("seed phase");

    harness
        .task_service
        .create_task(phase.id(), "Late addition")
        .await
        .expect("task creation should succeed");

    assert!(!phase_is_done(&harness, phase.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_with_blank_name_leaves_phase_completed(harness: Harness) {
    let phase = phase_record("Design", true, at(0));
    harness.phases.insert(&phase).await.expect("seed phase");

    let result = harness.task_service.create_task(phase.id(), "  ").await;

    assert_eq!(
        result,
        Err(ApiError::bad_request("task name must not be empty"))
    );
    assert!(phase_is_done(&harness, phase.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_task_renames_without_touching_done(harness: Harness) {
    let phase = phase_record("Design", false, at(0));
    harness.phases.insert(&phase).await.expect("seed phase");
    let task = task_record(phase.id(), "Sketch", false, at(1));
    harness.tasks.insert(&task).await.expect("seed task");

    let updated = harness
        .task_service
        .edit_task(task.id(), TaskEdit::new().with_name("Wireframe"))
        .await
        .expect("rename should succeed");

    assert_eq!(updated.name(), "Wireframe");
    assert!(!updated.is_done());
    assert!(updated.updated_on() > updated.created_on());
    assert!(!phase_is_done(&harness, phase.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_task_unknown_id_is_not_found(harness: Harness) {
    let result = harness
        .task_service
        .edit_task(TaskId::new(), TaskEdit::new().with_name("Anything"))
        .await;
    assert_eq!(result, Err(ApiError::NotFound));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_task_done_blocked_by_earlier_open_phase(harness: Harness) {
    let earlier = phase_record("Foundation", false, at(0));
    let later = phase_record("Framing", false, at(60));
    harness.phases.insert(&earlier).await.expect("seed earlier");
    harness.phases.insert(&later).await.expect("seed later");
    let task = task_record(later.id(), "Frame walls", false, at(61));
    harness.tasks.insert(&task).await.expect("seed task");

    let blocked = harness
        .task_service
        .edit_task(task.id(), TaskEdit::new().mark_done())
        .await;
    assert_eq!(
        blocked,
        Err(ApiError::bad_request("previous phases must be done"))
    );
    let untouched = harness
        .task_service
        .get_task_by_id(task.id())
        .await
        .expect("task lookup should succeed");
    assert!(!untouched.is_done());

    harness
        .phase_service
        .edit_phase(earlier.id(), PhaseEdit::new().mark_done())
        .await
        .expect("earlier phase should complete");

    let updated = harness
        .task_service
        .edit_task(task.id(), TaskEdit::new().mark_done())
        .await
        .expect("gate should pass once earlier phase is done");
    assert!(updated.is_done());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_task_done_completes_phase_when_last_open_task(harness: Harness) {
    let phase = harness
        .phase_service
        .create_phase("Design")
        .await
        .expect("phase creation should succeed");
    let task = harness
        .task_service
        .create_task(phase.id(), "Sketch")
        .await
        .expect("task creation should succeed");

    harness
        .task_service
        .edit_task(task.id(), TaskEdit::new().mark_done())
        .await
        .expect("done transition should succeed");

    assert!(phase_is_done(&harness, phase.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_task_done_leaves_phase_open_while_sibling_undone(harness: Harness) {
    let phase = harness
        .phase_service
        .create_phase("Design")
        .await
        .expect("phase creation should succeed");
    let first = harness
        .task_service
        .create_task(phase.id(), "Sketch")
        .await
        .expect("task creation should succeed");
    let second = harness
        .task_service
        .create_task(phase.id(), "Review")
        .await
        .expect("task creation should succeed");

    harness
        .task_service
        .edit_task(first.id(), TaskEdit::new().mark_done())
        .await
        .expect("first done transition should succeed");
    assert!(!phase_is_done(&harness, phase.id()).await);

    harness
        .task_service
        .edit_task(second.id(), TaskEdit::new().mark_done())
        .await
        .expect("second done transition should succeed");
    assert!(phase_is_done(&harness, phase.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_tasks_filters_by_phase_and_done(harness: Harness) {
    let first_phase = phase_record("Design", false, at(0));
    let second_phase = phase_record("Build", false, at(10));
    harness
        .phases
        .insert(&first_phase)
        .await
        .expect("seed phase");
    harness
        .phases
        .insert(&second_phase)
        .await
        .expect("seed phase");
    let wanted = task_record(first_phase.id(), "Sketch", false, at(1));
    harness.tasks.insert(&wanted).await.expect("seed task");
    harness
        .tasks
        .insert(&task_record(first_phase.id(), "Approve", true, at(2)))
        .await
        .expect("seed task");
    harness
        .tasks
        .insert(&task_record(second_phase.id(), "Pour", false, at(11)))
        .await
        .expect("seed task");

    let filters = TaskFilters {
        phase_id: Some(first_phase.id()),
        done: Some(false),
        name: None,
    };
    let page = harness
        .task_service
        .get_tasks(&filters, &PageRequest::default())
        .await
        .expect("listing should succeed");

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data.first().map(crate::domain::Task::id), Some(wanted.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_task_by_id_unknown_is_not_found(harness: Harness) {
    let result = harness.task_service.get_task_by_id(TaskId::new()).await;
    assert_eq!(result, Err(ApiError::NotFound));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_task_reports_removed_rows(harness: Harness) {
    let phase = phase_record("Design", false, at(0));
    harness.phases.insert(&phase).await.expect("seed phase");
    let task = task_record(phase.id(), "Sketch", false, at(1));
    harness.tasks.insert(&task).await.expect("seed task");

    let removed = harness
        .task_service
        .delete_task_by_id(task.id())
        .await
        .expect("delete should succeed");
    assert_eq!(removed, 1);

    let second = harness
        .task_service
        .delete_task_by_id(task.id())
        .await
        .expect("repeat delete should succeed");
    assert_eq!(second, 0);
}
