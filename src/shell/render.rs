//! Task list rendering for the dashboard.

use crate::models::Task;

/// How the dashboard lays out the task list.
///
/// `Card` shows one block per task with the description; `List` is one
/// line per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Card,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Card => Self::List,
            Self::List => Self::Card,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::List => "list",
        }
    }
}

fn status_badge(task: &Task) -> &'static str {
    if task.is_done() {
        "[Done]"
    } else {
        "[In Progress]"
    }
}

/// Render the task list. Indices are 1-based and follow the newest-first
/// ordering of the collection.
pub fn task_list(tasks: &[Task], mode: ViewMode) -> String {
    if tasks.is_empty() {
        return "No tasks yet. Add a new task to get started.\n".to_string();
    }

    let mut out = format!("Your Tasks ({})\n", tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        match mode {
            ViewMode::Card => {
                out.push_str(&format!(
                    "\n  {}. {} {}\n",
                    index + 1,
                    task.title,
                    status_badge(task)
                ));
                if let Some(description) = &task.description {
                    out.push_str(&format!("     {}\n", description));
                }
                out.push_str(&format!(
                    "     updated {}\n",
                    task.updated_at.format("%Y-%m-%d %H:%M")
                ));
            }
            ViewMode::List => {
                let check = if task.is_done() { "x" } else { " " };
                out.push_str(&format!(
                    "  {}. [{}] {} {}\n",
                    index + 1,
                    check,
                    task.title,
                    status_badge(task)
                ));
            }
        }
    }
    out
}
