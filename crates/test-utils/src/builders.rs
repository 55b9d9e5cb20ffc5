#![allow(dead_code)]

use tm2bd::source::{Priority, Subtask, Task, TaskList, TaskStatus};

/// Builder for `TaskList` to simplify test setup.
pub struct TaskListBuilder {
    tasks: Vec<Task>,
}

impl TaskListBuilder {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> TaskList {
        TaskList::new(self.tasks).expect("Failed to build valid task list from builder")
    }
}

impl Default for TaskListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Task`.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: u32, title: &str) -> Self {
        Self {
            task: Task {
                id,
                title: title.to_string(),
                description: format!("Description of {title}"),
                status: TaskStatus::Pending,
                priority: Priority::Medium,
                dependencies: vec![],
                complexity: None,
                details: None,
                test_strategy: None,
                subtasks: vec![],
            },
        }
    }

    pub fn depends_on(mut self, dep: u32) -> Self {
        self.task.dependencies.push(dep);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn complexity(mut self, complexity: u8) -> Self {
        self.task.complexity = Some(complexity);
        self
    }

    pub fn details(mut self, details: &str) -> Self {
        self.task.details = Some(details.to_string());
        self
    }

    pub fn test_strategy(mut self, strategy: &str) -> Self {
        self.task.test_strategy = Some(strategy.to_string());
        self
    }

    pub fn subtask(mut self, subtask: Subtask) -> Self {
        self.task.subtasks.push(subtask);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for `Subtask`.
pub struct SubtaskBuilder {
    subtask: Subtask,
}

impl SubtaskBuilder {
    pub fn new(id: u32, title: &str) -> Self {
        Self {
            subtask: Subtask {
                id,
                title: title.to_string(),
                description: format!("Description of {title}"),
                status: TaskStatus::Pending,
                dependencies: vec![],
                details: None,
            },
        }
    }

    pub fn depends_on(mut self, sibling: u32) -> Self {
        self.subtask.dependencies.push(sibling);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.subtask.status = status;
        self
    }

    pub fn details(mut self, details: &str) -> Self {
        self.subtask.details = Some(details.to_string());
        self
    }

    pub fn build(self) -> Subtask {
        self.subtask
    }
}
