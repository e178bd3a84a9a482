//! Things URL scheme builders and launcher

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

const SCHEME: &str = "things:///";

/// Fields for a new to-do. Empty values are left out of the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    pub tags: Vec<String>,
    /// Project or area name
    pub list: Option<String>,
    pub checklist_items: Vec<String>,
    pub heading: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    pub tags: Vec<String>,
    pub area: Option<String>,
    pub todos: Vec<String>,
}

/// Changes to an existing item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub prepend_notes: Option<String>,
    pub append_notes: Option<String>,
    pub when: Option<String>,
    pub deadline: Option<String>,
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

struct UrlBuilder {
    command: &'static str,
    params: Vec<(&'static str, String)>,
}

impl UrlBuilder {
    const fn new(command: &'static str) -> Self {
        Self {
            command,
            params: Vec::new(),
        }
    }

    fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// Skips `None` and blank values.
    fn optional(self, key: &'static str, value: Option<&String>) -> Self {
        match normalize_text_option(value.cloned()) {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Keeps explicit empty strings so a field can be cleared.
    fn present(self, key: &'static str, value: Option<&String>) -> Self {
        match value {
            Some(value) => self.param(key, value.clone()),
            None => self,
        }
    }

    fn joined(self, key: &'static str, values: &[String], separator: &str) -> Self {
        if values.is_empty() {
            self
        } else {
            self.param(key, values.join(separator))
        }
    }

    fn build(self) -> String {
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{SCHEME}{}?{query}", self.command)
    }
}

pub fn add_url(todo: &NewTodo) -> String {
    UrlBuilder::new("add")
        .param("title", todo.title.clone())
        .optional("notes", todo.notes.as_ref())
        .optional("when", todo.when.as_ref())
        .optional("deadline", todo.deadline.as_ref())
        .joined("tags", &todo.tags, ",")
        .optional("list", todo.list.as_ref())
        .joined("checklist-items", &todo.checklist_items, "\n")
        .optional("heading", todo.heading.as_ref())
        .build()
}

pub fn add_project_url(project: &NewProject) -> String {
    UrlBuilder::new("add-project")
        .param("title", project.title.clone())
        .optional("notes", project.notes.as_ref())
        .optional("when", project.when.as_ref())
        .optional("deadline", project.deadline.as_ref())
        .joined("tags", &project.tags, ",")
        .optional("area", project.area.as_ref())
        .joined("to-dos", &project.todos, "\n")
        .build()
}

pub fn update_url(id: &str, auth_token: &str, update: &TaskUpdate) -> String {
    let mut builder = UrlBuilder::new("update")
        .param("id", id)
        .param("auth-token", auth_token)
        .present("title", update.title.as_ref())
        .present("notes", update.notes.as_ref())
        .present("prepend-notes", update.prepend_notes.as_ref())
        .present("append-notes", update.append_notes.as_ref())
        .present("when", update.when.as_ref())
        .present("deadline", update.deadline.as_ref());

    if let Some(tags) = &update.tags {
        builder = builder.param("tags", tags.join(","));
    }
    if let Some(completed) = update.completed {
        builder = builder.param("completed", completed.to_string());
    }
    if let Some(canceled) = update.canceled {
        builder = builder.param("canceled", canceled.to_string());
    }
    builder.build()
}

/// `id` is a built-in list name (today, inbox, upcoming, ...) or an item uuid.
pub fn show_url(id: &str) -> String {
    UrlBuilder::new("show").param("id", id).build()
}

pub fn search_url(query: &str) -> String {
    UrlBuilder::new("search").param("query", query).build()
}

/// Hands a URL to whatever handles it on this machine
pub trait UrlOpener {
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Launches through the OS default handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        open::that(url)?;
        Ok(())
    }
}

/// Fire-and-forget write operations. Each returns the launched URL.
pub struct TaskWriter<O = SystemOpener> {
    opener: O,
    auth_token: Option<String>,
}

impl TaskWriter<SystemOpener> {
    pub fn system(auth_token: Option<String>) -> Self {
        Self::new(SystemOpener, auth_token)
    }
}

impl<O: UrlOpener> TaskWriter<O> {
    pub fn new(opener: O, auth_token: Option<String>) -> Self {
        Self {
            opener,
            auth_token: normalize_text_option(auth_token),
        }
    }

    pub fn add(&self, todo: &NewTodo) -> Result<String> {
        if todo.title.trim().is_empty() {
            return Err(Error::InvalidInput("Task title cannot be empty".to_string()));
        }
        self.launch(add_url(todo))
    }

    pub fn add_project(&self, project: &NewProject) -> Result<String> {
        if project.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Project title cannot be empty".to_string(),
            ));
        }
        self.launch(add_project_url(project))
    }

    pub fn update(&self, id: &str, update: &TaskUpdate) -> Result<String> {
        let token = self.auth_token.as_deref().ok_or(Error::MissingAuthToken)?;
        self.launch(update_url(id, token, update))
    }

    pub fn complete(&self, id: &str) -> Result<String> {
        self.update(
            id,
            &TaskUpdate {
                completed: Some(true),
                ..TaskUpdate::default()
            },
        )
    }

    pub fn cancel(&self, id: &str) -> Result<String> {
        self.update(
            id,
            &TaskUpdate {
                canceled: Some(true),
                ..TaskUpdate::default()
            },
        )
    }

    pub fn show(&self, id: &str) -> Result<String> {
        self.launch(show_url(id))
    }

    pub fn search(&self, query: &str) -> Result<String> {
        self.launch(search_url(query))
    }

    fn launch(&self, url: String) -> Result<String> {
        tracing::debug!("Opening {}", redact_auth_token(&url));
        self.opener.open_url(&url)?;
        Ok(url)
    }
}

/// Mask the `auth-token` value so URLs can be logged.
pub fn redact_auth_token(url: &str) -> String {
    let Some(start) = url.find("auth-token=") else {
        return url.to_string();
    };
    let value_start = start + "auth-token=".len();
    let value_end = url[value_start..]
        .find('&')
        .map_or(url.len(), |offset| value_start + offset);
    format!("{}***{}", &url[..value_start], &url[value_end..])
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<String>>,
    }

    impl UrlOpener for &RecordingOpener {
        fn open_url(&self, url: &str) -> Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn add_url_encodes_spaces_and_joins_lists() {
        let url = add_url(&NewTodo {
            title: "Buy milk".to_string(),
            notes: Some("  ".to_string()),
            when: Some("today".to_string()),
            tags: vec!["Home".to_string(), "Errand".to_string()],
            checklist_items: vec!["Oat".to_string(), "Whole".to_string()],
            ..NewTodo::default()
        });

        assert_eq!(
            url,
            "things:///add?title=Buy%20milk&when=today&tags=Home%2CErrand&checklist-items=Oat%0AWhole"
        );
    }

    #[test]
    fn add_project_url_lists_todos() {
        let url = add_project_url(&NewProject {
            title: "Launch".to_string(),
            area: Some("Work".to_string()),
            todos: vec!["Draft".to_string(), "Ship it".to_string()],
            ..NewProject::default()
        });

        assert_eq!(
            url,
            "things:///add-project?title=Launch&area=Work&to-dos=Draft%0AShip%20it"
        );
    }

    #[test]
    fn update_url_carries_token_and_flags() {
        let url = update_url(
            "ABC",
            "tok",
            &TaskUpdate {
                append_notes: Some("more".to_string()),
                completed: Some(true),
                ..TaskUpdate::default()
            },
        );

        assert_eq!(
            url,
            "things:///update?id=ABC&auth-token=tok&append-notes=more&completed=true"
        );
    }

    #[test]
    fn show_and_search_urls() {
        assert_eq!(show_url("today"), "things:///show?id=today");
        assert_eq!(
            search_url("dentist appointment"),
            "things:///search?query=dentist%20appointment"
        );
    }

    #[test]
    fn update_requires_auth_token() {
        let opener = RecordingOpener::default();
        let writer = TaskWriter::new(&opener, Some("   ".to_string()));

        assert!(matches!(
            writer.complete("ABC").unwrap_err(),
            Error::MissingAuthToken
        ));
        assert!(matches!(
            writer.cancel("ABC").unwrap_err(),
            Error::MissingAuthToken
        ));
        assert!(opener.opened.borrow().is_empty());
    }

    #[test]
    fn writer_launches_each_url_once() {
        let opener = RecordingOpener::default();
        let writer = TaskWriter::new(&opener, Some("tok".to_string()));

        writer
            .add(&NewTodo {
                title: "Call plumber".to_string(),
                ..NewTodo::default()
            })
            .unwrap();
        writer.cancel("XYZ").unwrap();

        assert_eq!(
            *opener.opened.borrow(),
            vec![
                "things:///add?title=Call%20plumber".to_string(),
                "things:///update?id=XYZ&auth-token=tok&canceled=true".to_string(),
            ]
        );
    }

    #[test]
    fn blank_title_is_rejected_before_launch() {
        let opener = RecordingOpener::default();
        let writer = TaskWriter::new(&opener, None);

        assert!(matches!(
            writer.add(&NewTodo::default()).unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(opener.opened.borrow().is_empty());
    }

    #[test]
    fn redacts_token_for_logging() {
        assert_eq!(
            redact_auth_token("things:///update?id=A&auth-token=secret&completed=true"),
            "things:///update?id=A&auth-token=***&completed=true"
        );
        assert_eq!(redact_auth_token("things:///show?id=today"), "things:///show?id=today");
    }
}
