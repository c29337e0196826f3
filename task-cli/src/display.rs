//! Human-readable rendering of store results.

use crate::error::StoreError;
use crate::task::{Status, Task};

const RULE_WIDTH: usize = 50;

pub fn icon(status: Status) -> &'static str {
    match status {
        Status::Pending => "⏳",
        Status::InProgress => "🔄",
        Status::Done => "✅",
    }
}

fn title(status: Status) -> &'static str {
    match status {
        Status::Pending => "PENDING TASKS",
        Status::InProgress => "TASKS IN PROGRESS",
        Status::Done => "DONE TASKS",
    }
}

fn empty_message(status: Status) -> &'static str {
    match status {
        Status::Pending => "No pending tasks",
        Status::InProgress => "No tasks in progress",
        Status::Done => "No done tasks",
    }
}

fn banner(heading: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("\n{rule}\n{heading}\n{rule}\n")
}

pub fn task_line(task: &Task) -> String {
    format!(
        "{} ID: {} | {} | Status: {}",
        icon(task.status()),
        task.id(),
        task.description(),
        task.status()
    )
}

pub fn filtered_line(task: &Task) -> String {
    format!(
        "{} ID: {} | {}",
        icon(task.status()),
        task.id(),
        task.description()
    )
}

pub fn render_all(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "📝 No tasks recorded".to_string();
    }
    let mut out = banner("📋 ALL TASKS");
    for task in tasks {
        out.push_str(&task_line(task));
        out.push('\n');
    }
    out
}

pub fn render_filtered(status: Status, tasks: &[&Task]) -> String {
    if tasks.is_empty() {
        return format!("{} {}", icon(status), empty_message(status));
    }
    let mut out = banner(&format!("{} {}", icon(status), title(status)));
    for task in tasks {
        out.push_str(&filtered_line(task));
        out.push('\n');
    }
    out
}

pub fn added(task: &Task) -> String {
    format!("✅ Task added (ID: {})", task.id())
}

pub fn updated(task: &Task) -> String {
    format!("✅ Task {} updated", task.id())
}

pub fn deleted(task: &Task) -> String {
    format!("✅ Task {} deleted", task.id())
}

pub fn status_changed(task: &Task) -> String {
    format!("✅ Task {} marked as '{}'", task.id(), task.status())
}

pub fn error(err: &StoreError) -> String {
    format!("❌ {}", capitalize(&err.to_string()))
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u32, description: &str, status: Status) -> Task {
        let mut task = Task::new(id, description.to_string());
        task.set_status(status);
        task
    }

    #[test]
    fn test_task_line_includes_status() {
        let task = task(3, "write report", Status::InProgress);

        assert_eq!(
            task_line(&task),
            "🔄 ID: 3 | write report | Status: in_progress"
        );
        assert_eq!(filtered_line(&task), "🔄 ID: 3 | write report");
    }

    #[test]
    fn test_render_all_empty() {
        assert_eq!(render_all(&[]), "📝 No tasks recorded");
    }

    #[test]
    fn test_render_all_lists_in_order() {
        let tasks = vec![
            task(1, "first", Status::Done),
            task(2, "second", Status::Pending),
        ];

        let out = render_all(&tasks);

        assert!(out.contains("📋 ALL TASKS"));
        let first = out.find("ID: 1").unwrap();
        let second = out.find("ID: 2").unwrap();
        assert!(first < second);
        assert!(out.contains("✅ ID: 1 | first | Status: done"));
    }

    #[test]
    fn test_render_filtered_empty_messages() {
        assert_eq!(render_filtered(Status::Pending, &[]), "⏳ No pending tasks");
        assert_eq!(
            render_filtered(Status::InProgress, &[]),
            "🔄 No tasks in progress"
        );
        assert_eq!(render_filtered(Status::Done, &[]), "✅ No done tasks");
    }

    #[test]
    fn test_render_filtered_uses_status_heading() {
        let done = task(4, "ship it", Status::Done);

        let out = render_filtered(Status::Done, &[&done]);

        assert!(out.contains("✅ DONE TASKS"));
        assert!(out.contains("✅ ID: 4 | ship it\n"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            error(&StoreError::NotFound(8)),
            "❌ Task with ID 8 not found"
        );
        assert!(error(&StoreError::InvalidStatus("x".to_string())).starts_with("❌ Invalid status"));
    }
}
