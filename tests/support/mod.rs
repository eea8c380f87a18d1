#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

use bord::actor::{Actor, Role};
use bord::board::{Board, NewTask};

/// A temp-dir board seeded with one project and a Todo/Doing/Done layout,
/// Done flagged as a completion column.
pub struct TestBoard {
    dir: TempDir,
    pub board: Board,
    pub project_id: String,
    pub todo: String,
    pub doing: String,
    pub done: String,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let board = Board::open(dir.path().to_path_buf());
        board.store().init().expect("init board");

        let actor = Self::actor();
        let project = board.create_project("demo", &actor).expect("create project");
        let todo = board
            .create_column(&project.id, "Todo", false, &actor)
            .expect("todo column")
            .id;
        let doing = board
            .create_column(&project.id, "Doing", false, &actor)
            .expect("doing column")
            .id;
        let done = board
            .create_column(&project.id, "Done", true, &actor)
            .expect("done column")
            .id;

        Self {
            dir,
            board,
            project_id: project.id,
            todo,
            doing,
            done,
        }
    }

    pub fn actor() -> Actor {
        Actor {
            id: "tester".to_string(),
            role: Role::Member,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open an independent handle on the same board, as another process
    /// would.
    pub fn reopen(&self) -> Board {
        Board::open(self.dir.path().to_path_buf())
    }

    pub fn add_task(&self, title: &str, column: &str) -> String {
        self.board
            .create_task(
                &self.project_id,
                NewTask {
                    title: title.to_string(),
                    status_id: Some(column.to_string()),
                    ..Default::default()
                },
                &Self::actor(),
            )
            .expect("create task")
            .id
    }

    /// `(task_id, position)` pairs of a column's non-archived tasks, in
    /// position order.
    pub fn column_order(&self, column: &str) -> Vec<(String, u32)> {
        let state = self
            .board
            .store()
            .load_project(&self.project_id)
            .expect("load project");
        state
            .column_tasks(column)
            .iter()
            .map(|task| (task.id.clone(), task.position))
            .collect()
    }

    pub fn assert_contiguous(&self, column: &str) {
        for (index, (task_id, position)) in self.column_order(column).iter().enumerate() {
            assert_eq!(
                *position, index as u32,
                "task {task_id} holds position {position}, expected {index}"
            );
        }
    }
}
