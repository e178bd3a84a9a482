//! Plain-text rendering of tasks and projects for terminal output

use std::collections::BTreeMap;

use crate::tasks::models::{ProjectOverview, Task, TaskStatus};

const NOTES_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Project,
    Area,
    Tag,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub verbose: bool,
    pub show_uuid: bool,
}

const fn checkbox(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Incomplete => "☐",
        TaskStatus::Completed => "☑",
        TaskStatus::Canceled => "☒",
    }
}

pub fn format_task(task: &Task, options: FormatOptions) -> String {
    let title = if task.title.is_empty() {
        "Untitled"
    } else {
        &task.title
    };
    let mut output = format!("{} {title}", checkbox(task.status));
    if options.show_uuid {
        output.push_str(&format!(" [{}]", task.uuid));
    }

    if !options.verbose {
        return output;
    }

    let mut lines = vec![output];
    if !task.notes.is_empty() {
        lines.push(format!("   📝 {}", preview(&task.notes)));
    }
    if !task.tags.is_empty() {
        lines.push(format!("   🏷️  {}", task.tags.join(", ")));
    }
    if let Some(project) = &task.project {
        lines.push(format!("   📂 {}", project.title));
    }
    if let Some(area) = &task.area {
        lines.push(format!("   📍 {}", area.title));
    }
    if let Some(deadline) = task.deadline {
        lines.push(format!("   ⏰ Deadline: {}", deadline.format("%Y-%m-%d")));
    }
    if let Some(start_date) = task.start_date {
        lines.push(format!("   📅 Scheduled: {}", start_date.format("%Y-%m-%d")));
    }
    lines.join("\n")
}

fn preview(notes: &str) -> String {
    if notes.chars().count() > NOTES_PREVIEW_CHARS {
        let truncated: String = notes.chars().take(NOTES_PREVIEW_CHARS).collect();
        format!("{truncated}...")
    } else {
        notes.to_string()
    }
}

pub fn format_task_list(tasks: &[Task], options: FormatOptions, group_by: Option<GroupBy>) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let Some(group_by) = group_by else {
        return tasks
            .iter()
            .map(|task| format_task(task, options))
            .collect::<Vec<_>>()
            .join("\n\n");
    };

    let mut groups: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        groups.entry(group_key(task, group_by)).or_default().push(task);
    }

    let mut lines = Vec::new();
    for (name, members) in groups {
        lines.push(format!("\n═══ {name} ({}) ═══", members.len()));
        lines.extend(members.into_iter().map(|task| format_task(task, options)));
    }
    lines.join("\n")
}

fn group_key(task: &Task, group_by: GroupBy) -> &str {
    match group_by {
        GroupBy::Project => task
            .project
            .as_ref()
            .map_or("No Project", |item| item.title.as_str()),
        GroupBy::Area => task
            .area
            .as_ref()
            .map_or("No Area", |item| item.title.as_str()),
        GroupBy::Tag => task.tags.first().map_or("No Tags", String::as_str),
    }
}

pub fn format_project(overview: &ProjectOverview, include_tasks: bool) -> String {
    let project = &overview.project;
    let title = if project.title.is_empty() {
        "Untitled Project"
    } else {
        &project.title
    };

    let mut output = format!("📁 {title}");
    if let Some(area) = &project.area {
        output.push_str(&format!(" ({})", area.title));
    }
    if !overview.todos.is_empty() {
        output.push_str(&format!(
            " - {}/{} tasks",
            overview.completed_count(),
            overview.todos.len()
        ));
    }

    if include_tasks && !overview.todos.is_empty() {
        output.push('\n');
        for todo in &overview.todos {
            output.push_str("\n  ");
            output.push_str(&format_task(todo, FormatOptions::default()));
        }
    }
    output
}

pub fn format_project_list(projects: &[ProjectOverview], include_tasks: bool) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }
    projects
        .iter()
        .map(|project| format_project(project, include_tasks))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn summarize_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }

    let count = |status: TaskStatus| tasks.iter().filter(|task| task.status == status).count();
    let canceled = count(TaskStatus::Canceled);
    let with_deadline = tasks.iter().filter(|task| task.deadline.is_some()).count();
    let tagged = tasks.iter().filter(|task| !task.tags.is_empty()).count();

    let mut summary = vec![
        format!("📊 Summary: {} total tasks", tasks.len()),
        format!("   ☐ {} incomplete", count(TaskStatus::Incomplete)),
        format!("   ☑ {} completed", count(TaskStatus::Completed)),
    ];
    if canceled > 0 {
        summary.push(format!("   ☒ {canceled} canceled"));
    }
    if with_deadline > 0 {
        summary.push(format!("   ⏰ {with_deadline} with deadlines"));
    }
    if tagged > 0 {
        summary.push(format!("   🏷️  {tagged} tagged"));
    }
    summary.join("\n")
}
