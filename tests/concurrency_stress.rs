mod support;

use std::thread;

use bord::actor::{Actor, Role};
use bord::board::{Board, NewTask};
use bord::error::Error;
use bord::lock::{self, FileLock};
use tempfile::TempDir;

use support::TestBoard;

#[test]
fn contiguity_survives_parallel_movers() {
    let fixture = TestBoard::new();
    let ids: Vec<String> = (0..6)
        .map(|index| fixture.add_task(&format!("task-{index}"), &fixture.todo))
        .collect();

    let threads = 4;
    let moves_per_thread = 10;
    let mut handles = Vec::new();
    for thread_index in 0..threads {
        let board = fixture.reopen();
        let project_id = fixture.project_id.clone();
        let column = fixture.todo.clone();
        let ids = ids.clone();

        handles.push(thread::spawn(move || {
            let actor = Actor {
                id: format!("mover-{thread_index}"),
                role: Role::Member,
            };
            for step in 0..moves_per_thread {
                let task = &ids[(thread_index * 3 + step) % ids.len()];
                let target = (step * 2 + thread_index) % (ids.len() + 2);
                board
                    .move_task(&project_id, task, &column, target, &actor)
                    .expect("concurrent move");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("mover thread");
    }

    // Whatever interleaving won, the invariant holds and no task was lost.
    let order = fixture.column_order(&fixture.todo);
    assert_eq!(order.len(), ids.len());
    fixture.assert_contiguous(&fixture.todo);
    let mut seen: Vec<String> = order.into_iter().map(|(id, _)| id).collect();
    seen.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn parallel_creators_append_without_collisions() {
    let fixture = TestBoard::new();

    let threads = 4;
    let per_thread = 5;
    let mut handles = Vec::new();
    for thread_index in 0..threads {
        let board = fixture.reopen();
        let project_id = fixture.project_id.clone();
        let column = fixture.todo.clone();

        handles.push(thread::spawn(move || {
            let actor = Actor {
                id: format!("creator-{thread_index}"),
                role: Role::Member,
            };
            for step in 0..per_thread {
                board
                    .create_task(
                        &project_id,
                        NewTask {
                            title: format!("t{thread_index}-{step}"),
                            status_id: Some(column.clone()),
                            ..Default::default()
                        },
                        &actor,
                    )
                    .expect("concurrent create");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("creator thread");
    }

    let order = fixture.column_order(&fixture.todo);
    assert_eq!(order.len(), threads * per_thread);
    fixture.assert_contiguous(&fixture.todo);
}

#[test]
fn registry_handles_parallel_project_creation() {
    let fixture = TestBoard::new();

    let mut handles = Vec::new();
    for index in 0..4 {
        let board = fixture.reopen();
        handles.push(thread::spawn(move || {
            let actor = Actor {
                id: "spawner".to_string(),
                role: Role::Admin,
            };
            board
                .create_project(&format!("team-{index}"), &actor)
                .expect("concurrent project")
        }));
    }
    for handle in handles {
        handle.join().expect("project thread");
    }

    // Four new projects plus the fixture's.
    assert_eq!(fixture.board.list_projects().expect("list").len(), 5);
}

#[test]
fn held_board_lock_times_out_as_lock_failed() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join(".bord.toml"),
        "[board]\nlock_timeout_ms = 100\n",
    )
    .expect("config");

    let board = Board::open(dir.path().to_path_buf());
    board.store().init().expect("init");
    let actor = Actor {
        id: "tester".to_string(),
        role: Role::Member,
    };
    let project = board.create_project("demo", &actor).expect("project");
    let column = board
        .create_column(&project.id, "Todo", false, &actor)
        .expect("column");
    let task = board
        .create_task(
            &project.id,
            NewTask {
                title: "held".to_string(),
                status_id: Some(column.id.clone()),
                ..Default::default()
            },
            &actor,
        )
        .expect("task");

    let lock_path = lock::lock_path(&board.store().board_file(&project.id));
    let _held = FileLock::acquire(&lock_path, 1000).expect("hold lock");

    let err = board
        .move_task(&project.id, &task.id, &column.id, 0, &actor)
        .expect_err("lock is held elsewhere");
    assert!(matches!(err, Error::LockFailed(_)));
}
