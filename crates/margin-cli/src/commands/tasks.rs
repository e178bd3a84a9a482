use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use margin_core::tasks::{
    format_project_list, format_task, FormatOptions, NewProject, NewTodo, TaskSearch, TaskStore,
    TaskUpdate, TaskWriter, UrlOpener,
};
use margin_core::util::normalize_text_option;

use crate::cli::{ListView, ScheduleArgs, StatusArg, TaskCommands};
use crate::commands::common::{
    normalize_search_query, normalize_task_id, open_task_store, render_task_list, today,
};
use crate::error::CliError;
use crate::settings::{default_settings_path, TaskSettings};

pub fn run_tasks(things_db: Option<PathBuf>, command: TaskCommands) -> Result<(), CliError> {
    let store = || open_task_store(things_db.clone());
    let writer = || -> Result<TaskWriter, CliError> {
        let settings = TaskSettings::load()?;
        Ok(TaskWriter::system(settings.resolve_auth_token()))
    };

    let output = match command {
        TaskCommands::Today { view } => list_today(&store()?, today(), view)?,
        TaskCommands::Inbox { view } => render_task_list(&store()?.inbox()?, view)?,
        TaskCommands::Upcoming { view } => render_task_list(&store()?.upcoming(today())?, view)?,
        TaskCommands::Anytime { view } => render_task_list(&store()?.anytime()?, view)?,
        TaskCommands::List { status, view } => list_todos(&store()?, status, view)?,
        TaskCommands::Search {
            query,
            status,
            area,
            project,
            tag,
            view,
        } => {
            let search = TaskSearch {
                query: normalize_search_query(&query)?,
                status: status.map(Into::into),
                area: normalize_text_option(area),
                project: normalize_text_option(project),
                tag: normalize_text_option(tag),
            };
            render_task_list(&store()?.search(&search)?, view)?
        }
        TaskCommands::Find { title, view } => {
            let title = normalize_search_query(&title)?;
            render_task_list(&store()?.find_by_title(&title)?, view)?
        }
        TaskCommands::Projects {
            area,
            include_tasks,
            json,
        } => list_projects(&store()?, area.as_deref(), include_tasks, json)?,
        TaskCommands::Areas { json } => list_areas(&store()?, json)?,
        TaskCommands::Tags { json } => list_tags(&store()?, json)?,
        TaskCommands::Get { uuid, json } => show_task(&store()?, &uuid, json)?,
        TaskCommands::Add {
            title,
            schedule,
            list,
            heading,
            checklist_items,
        } => {
            let todo = build_todo(title, schedule, list, heading, checklist_items);
            writer()?.add(&todo)?;
            format!("Sent to Things: new to-do \"{}\"", todo.title.trim())
        }
        TaskCommands::AddProject {
            title,
            schedule,
            area,
            todos,
        } => {
            let project = build_project(title, schedule, area, todos);
            writer()?.add_project(&project)?;
            format!("Sent to Things: new project \"{}\"", project.title.trim())
        }
        TaskCommands::Update {
            uuid,
            title,
            notes,
            prepend_notes,
            append_notes,
            when,
            deadline,
            tags,
        } => {
            let update = TaskUpdate {
                title,
                notes,
                prepend_notes,
                append_notes,
                when,
                deadline,
                tags,
                ..TaskUpdate::default()
            };
            update_task(&writer()?, &uuid, &update)?
        }
        TaskCommands::Complete { uuid } => complete_task(&writer()?, &uuid)?,
        TaskCommands::Cancel { uuid } => cancel_task(&writer()?, &uuid)?,
        TaskCommands::Show { id } => {
            let id = normalize_task_id(&id)?;
            writer()?.show(&id)?;
            format!("Opened {id} in Things")
        }
        TaskCommands::Open { query } => {
            let query = normalize_search_query(&query)?;
            writer()?.search(&query)?;
            format!("Opened Things search for \"{query}\"")
        }
        TaskCommands::SetToken { token } => {
            let path = default_settings_path()?;
            save_auth_token(&path, &token)?;
            format!("Saved Things auth token to {}", path.display())
        }
    };

    println!("{output}");
    Ok(())
}

pub fn list_todos(
    store: &TaskStore,
    status: Option<StatusArg>,
    view: ListView,
) -> Result<String, CliError> {
    let tasks = store.todos(status.map(Into::into))?;
    render_task_list(&tasks, view)
}

pub fn list_today(store: &TaskStore, today: NaiveDate, view: ListView) -> Result<String, CliError> {
    render_task_list(&store.today(today)?, view)
}

pub fn list_projects(
    store: &TaskStore,
    area: Option<&str>,
    include_tasks: bool,
    as_json: bool,
) -> Result<String, CliError> {
    let projects = store.projects(area)?;
    if as_json {
        return Ok(serde_json::to_string_pretty(&projects)?);
    }
    Ok(format_project_list(&projects, include_tasks))
}

pub fn list_areas(store: &TaskStore, as_json: bool) -> Result<String, CliError> {
    let areas = store.areas()?;
    if as_json {
        return Ok(serde_json::to_string_pretty(&areas)?);
    }
    if areas.is_empty() {
        return Ok("No areas found.".to_string());
    }
    Ok(areas
        .iter()
        .map(|area| format!("📍 {}", area.title))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn list_tags(store: &TaskStore, as_json: bool) -> Result<String, CliError> {
    let tags = store.tags()?;
    if as_json {
        return Ok(serde_json::to_string_pretty(&tags)?);
    }
    if tags.is_empty() {
        return Ok("No tags found.".to_string());
    }
    Ok(tags
        .iter()
        .map(|tag| match &tag.shortcut {
            Some(shortcut) => format!("🏷️  {} ({shortcut})", tag.title),
            None => format!("🏷️  {}", tag.title),
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn show_task(store: &TaskStore, uuid: &str, as_json: bool) -> Result<String, CliError> {
    let uuid = normalize_task_id(uuid)?;
    let task = store
        .get(&uuid)
        .ok_or_else(|| CliError::TaskNotFound(uuid.clone()))?;
    if as_json {
        return Ok(serde_json::to_string_pretty(&task)?);
    }
    Ok(format_task(
        &task,
        FormatOptions {
            verbose: true,
            show_uuid: true,
        },
    ))
}

pub fn build_todo(
    title: String,
    schedule: ScheduleArgs,
    list: Option<String>,
    heading: Option<String>,
    checklist_items: Vec<String>,
) -> NewTodo {
    NewTodo {
        title,
        notes: schedule.notes,
        when: schedule.when,
        deadline: schedule.deadline,
        tags: clean_names(schedule.tags),
        list,
        checklist_items: clean_names(checklist_items),
        heading,
    }
}

pub fn build_project(
    title: String,
    schedule: ScheduleArgs,
    area: Option<String>,
    todos: Vec<String>,
) -> NewProject {
    NewProject {
        title,
        notes: schedule.notes,
        when: schedule.when,
        deadline: schedule.deadline,
        tags: clean_names(schedule.tags),
        area,
        todos: clean_names(todos),
    }
}

pub fn update_task<O: UrlOpener>(
    writer: &TaskWriter<O>,
    uuid: &str,
    update: &TaskUpdate,
) -> Result<String, CliError> {
    let uuid = normalize_task_id(uuid)?;
    if update.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    writer.update(&uuid, update)?;
    Ok(format!("Sent to Things: update for {uuid}"))
}

pub fn complete_task<O: UrlOpener>(writer: &TaskWriter<O>, uuid: &str) -> Result<String, CliError> {
    let uuid = normalize_task_id(uuid)?;
    writer.complete(&uuid)?;
    Ok(format!("Sent to Things: complete {uuid}"))
}

pub fn cancel_task<O: UrlOpener>(writer: &TaskWriter<O>, uuid: &str) -> Result<String, CliError> {
    let uuid = normalize_task_id(uuid)?;
    writer.cancel(&uuid)?;
    Ok(format!("Sent to Things: cancel {uuid}"))
}

pub fn save_auth_token(path: &Path, token: &str) -> Result<(), CliError> {
    let token = normalize_text_option(Some(token.to_string()))
        .ok_or_else(|| CliError::Config("Auth token cannot be empty".to_string()))?;
    let mut settings = TaskSettings::load_from_path(path)?;
    settings.auth_token = Some(token);
    settings.save_to_path(path)
}

fn clean_names(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|value| normalize_text_option(Some(value)))
        .collect()
}
