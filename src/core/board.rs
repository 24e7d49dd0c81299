use super::task::{Task, TaskStatus};

/// One kanban column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// Tasks grouped by status, columns in `TaskStatus::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Board {
    /// Group tasks into columns. Order inside a column follows the input.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| Column {
                status,
                tasks: tasks.iter().filter(|t| t.status == status).cloned().collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, status: TaskStatus) -> Option<&Column> {
        self.columns.iter().find(|c| c.status == status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TasksSummary {
    pub total: usize,
    pub done: usize,
}

impl TasksSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            total: tasks.len(),
            done: tasks.iter().filter(|t| t.is_done()).count(),
        }
    }
}
