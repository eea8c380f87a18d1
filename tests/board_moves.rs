mod support;

use bord::activity::ActivityDetails;
use bord::error::Error;

use support::TestBoard;

#[test]
fn same_column_reorder_shifts_only_the_gap() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);
    let b = fixture.add_task("B", &fixture.todo);
    let c = fixture.add_task("C", &fixture.todo);

    // [A:0, B:1, C:2] -- move B to index 0
    let outcome = fixture
        .board
        .move_task(&fixture.project_id, &b, &fixture.todo, 0, &TestBoard::actor())
        .expect("move");
    assert_eq!(outcome.task.position, 0);
    assert!(outcome.warning.is_none());

    assert_eq!(
        fixture.column_order(&fixture.todo),
        vec![(b, 0), (a, 1), (c, 2)]
    );
}

#[test]
fn cross_column_move_renumbers_both_columns() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);
    let b = fixture.add_task("B", &fixture.todo);
    let x = fixture.add_task("X", &fixture.doing);

    // Todo=[A:0, B:1], Doing=[X:0] -- move A into Doing at index 0
    fixture
        .board
        .move_task(&fixture.project_id, &a, &fixture.doing, 0, &TestBoard::actor())
        .expect("move");

    assert_eq!(fixture.column_order(&fixture.todo), vec![(b, 0)]);
    assert_eq!(
        fixture.column_order(&fixture.doing),
        vec![(a, 0), (x, 1)]
    );
}

#[test]
fn past_the_end_index_appends() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);
    let b = fixture.add_task("B", &fixture.todo);

    let outcome = fixture
        .board
        .move_task(&fixture.project_id, &a, &fixture.todo, 99, &TestBoard::actor())
        .expect("move");
    assert_eq!(outcome.task.position, 1);
    assert_eq!(
        fixture.column_order(&fixture.todo),
        vec![(b, 0), (a, 1)]
    );
}

#[test]
fn unrelated_tasks_keep_their_relative_order() {
    let fixture = TestBoard::new();
    let ids: Vec<String> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|title| fixture.add_task(title, &fixture.todo))
        .collect();

    // Move D (index 3) to index 1; A stays first, B/C shift down, E stays last.
    fixture
        .board
        .move_task(&fixture.project_id, &ids[3], &fixture.todo, 1, &TestBoard::actor())
        .expect("move");

    let order: Vec<String> = fixture
        .column_order(&fixture.todo)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(
        order,
        vec![
            ids[0].clone(),
            ids[3].clone(),
            ids[1].clone(),
            ids[2].clone(),
            ids[4].clone(),
        ]
    );
    fixture.assert_contiguous(&fixture.todo);
}

#[test]
fn move_into_completion_column_warns_but_succeeds() {
    let fixture = TestBoard::new();
    let blocked = fixture.add_task("Ship release", &fixture.todo);
    let blocking = fixture.add_task("Write changelog", &fixture.todo);
    fixture
        .board
        .add_dependency(&fixture.project_id, &blocked, &blocking, &TestBoard::actor())
        .expect("dependency");

    let outcome = fixture
        .board
        .move_task(&fixture.project_id, &blocked, &fixture.done, 0, &TestBoard::actor())
        .expect("move succeeds despite the block");
    let warning = outcome.warning.expect("warning attached");
    assert!(warning.contains("Write changelog"));
    assert_eq!(fixture.column_order(&fixture.done).len(), 1);
}

#[test]
fn no_warning_once_blockers_are_complete() {
    let fixture = TestBoard::new();
    let blocked = fixture.add_task("Ship release", &fixture.todo);
    let blocking = fixture.add_task("Write changelog", &fixture.todo);
    fixture
        .board
        .add_dependency(&fixture.project_id, &blocked, &blocking, &TestBoard::actor())
        .expect("dependency");

    fixture
        .board
        .move_task(&fixture.project_id, &blocking, &fixture.done, 0, &TestBoard::actor())
        .expect("move blocking task");
    let outcome = fixture
        .board
        .move_task(&fixture.project_id, &blocked, &fixture.done, 0, &TestBoard::actor())
        .expect("move blocked task");
    assert!(outcome.warning.is_none());
}

#[test]
fn archive_renumbers_and_unarchive_appends() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);
    let b = fixture.add_task("B", &fixture.todo);
    let c = fixture.add_task("C", &fixture.todo);

    fixture
        .board
        .archive_task(&fixture.project_id, &b, &TestBoard::actor())
        .expect("archive");
    assert_eq!(
        fixture.column_order(&fixture.todo),
        vec![(a.clone(), 0), (c.clone(), 1)]
    );

    fixture
        .board
        .unarchive_task(&fixture.project_id, &b, &TestBoard::actor())
        .expect("unarchive");
    assert_eq!(
        fixture.column_order(&fixture.todo),
        vec![(a, 0), (c, 1), (b, 2)]
    );
}

#[test]
fn archived_task_cannot_be_moved() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);
    fixture
        .board
        .archive_task(&fixture.project_id, &a, &TestBoard::actor())
        .expect("archive");

    let err = fixture
        .board
        .move_task(&fixture.project_id, &a, &fixture.doing, 0, &TestBoard::actor())
        .expect_err("archived tasks do not move");
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn delete_leaves_a_gap_that_the_next_move_closes() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);
    let b = fixture.add_task("B", &fixture.todo);
    let c = fixture.add_task("C", &fixture.todo);

    fixture
        .board
        .delete_task(&fixture.project_id, &b, &TestBoard::actor())
        .expect("delete");
    assert_eq!(
        fixture.column_order(&fixture.todo),
        vec![(a.clone(), 0), (c.clone(), 2)]
    );

    fixture
        .board
        .move_task(&fixture.project_id, &c, &fixture.todo, 0, &TestBoard::actor())
        .expect("move");
    assert_eq!(
        fixture.column_order(&fixture.todo),
        vec![(c, 0), (a, 1)]
    );
}

#[test]
fn move_validates_task_and_column() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);

    let missing_task = fixture
        .board
        .move_task(&fixture.project_id, "bd-none", &fixture.todo, 0, &TestBoard::actor())
        .expect_err("unknown task");
    assert!(matches!(missing_task, Error::TaskNotFound(_)));

    let missing_column = fixture
        .board
        .move_task(&fixture.project_id, &a, "col-foreign", 0, &TestBoard::actor())
        .expect_err("unknown column");
    assert!(matches!(missing_column, Error::ColumnNotFound(_)));
}

#[test]
fn only_cross_column_moves_log_status_changes() {
    let fixture = TestBoard::new();
    let a = fixture.add_task("A", &fixture.todo);
    fixture.add_task("B", &fixture.todo);

    fixture
        .board
        .move_task(&fixture.project_id, &a, &fixture.todo, 1, &TestBoard::actor())
        .expect("same-column move");
    fixture
        .board
        .move_task(&fixture.project_id, &a, &fixture.doing, 0, &TestBoard::actor())
        .expect("cross-column move");

    let entries = fixture
        .board
        .store()
        .activity_log(&fixture.project_id)
        .read_all()
        .expect("activity");
    let status_changes: Vec<_> = entries
        .iter()
        .filter(|entry| matches!(entry.details, ActivityDetails::StatusChanged { .. }))
        .collect();
    assert_eq!(status_changes.len(), 1);
    match &status_changes[0].details {
        ActivityDetails::StatusChanged { from, to } => {
            assert_eq!(from, &fixture.todo);
            assert_eq!(to, &fixture.doing);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}
