//! Read-only access to the Things 3 database

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::tasks::models::{
    decode_packed_date, Area, ItemRef, ProjectOverview, StartBucket, TagRecord, Task, TaskKind,
    TaskStatus,
};

pub const DB_PATH_ENV_VAR: &str = "THINGS_DB_PATH";

const GROUP_CONTAINER: &str =
    "Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac";
const DATABASE_BUNDLE: &str = "Things Database.thingsdatabase";
const DATABASE_FILE: &str = "main.sqlite";

const TASK_SELECT: &str = r#"
SELECT t.uuid, t.title, t.notes, t.type, t.status, t.start, t.startDate, t.deadline,
       t.todayIndex, p.uuid, p.title, COALESCE(a.uuid, pa.uuid), COALESCE(a.title, pa.title)
FROM TMTask t
LEFT JOIN TMTask h ON h.uuid = t.heading
LEFT JOIN TMTask p ON p.uuid = COALESCE(t.project, h.project)
LEFT JOIN TMArea a ON a.uuid = t.area
LEFT JOIN TMArea pa ON pa.uuid = p.area
WHERE t.trashed = 0"#;

/// SQL-level filter for [`TaskStore::query`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub kind: Option<TaskKind>,
    pub status: Option<TaskStatus>,
    pub start: Option<StartBucket>,
    pub project_uuid: Option<String>,
}

impl TaskQuery {
    pub fn todos() -> Self {
        Self {
            kind: Some(TaskKind::Todo),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn with_start(mut self, start: StartBucket) -> Self {
        self.start = Some(start);
        self
    }
}

/// Text search with optional exact-name filters, all case-insensitive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSearch {
    pub query: String,
    pub status: Option<TaskStatus>,
    pub area: Option<String>,
    pub project: Option<String>,
    pub tag: Option<String>,
}

/// Read-only handle on a Things database file
pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    /// Open the database read-only. The file must already exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InvalidInput(format!(
                "Things database not found at {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!("Opened Things database at {}", path.display());
        Ok(Self { conn })
    }

    /// Run a task query, newest schema order first.
    pub fn query(&self, filter: &TaskQuery) -> Result<Vec<Task>> {
        let mut sql = TASK_SELECT.to_string();
        let mut values: Vec<Value> = Vec::new();

        if let Some(kind) = filter.kind {
            sql.push_str(" AND t.type = ?");
            values.push(Value::Integer(kind.to_db()));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND t.status = ?");
            values.push(Value::Integer(status.to_db()));
        }
        if let Some(start) = filter.start {
            sql.push_str(" AND t.start = ?");
            values.push(Value::Integer(start.to_db()));
        }
        if let Some(project_uuid) = &filter.project_uuid {
            sql.push_str(" AND p.uuid = ?");
            values.push(Value::Text(project_uuid.clone()));
        }
        sql.push_str(" ORDER BY t.\"index\"");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut tasks = stmt
            .query_map(params_from_iter(values), Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        self.attach_tags(&mut tasks)?;
        Ok(tasks)
    }

    /// All to-dos, optionally restricted to one status
    pub fn todos(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let mut filter = TaskQuery::todos();
        filter.status = status;
        self.query(&filter)
    }

    /// Incomplete to-dos scheduled on or before `today`, in Today order
    pub fn today(&self, today: NaiveDate) -> Result<Vec<Task>> {
        let tasks = self.todos(Some(TaskStatus::Incomplete))?;
        Ok(filter_today(tasks, today))
    }

    pub fn inbox(&self) -> Result<Vec<Task>> {
        self.query(
            &TaskQuery::todos()
                .with_status(TaskStatus::Incomplete)
                .with_start(StartBucket::Inbox),
        )
    }

    /// Incomplete to-dos scheduled after `today`, soonest first
    pub fn upcoming(&self, today: NaiveDate) -> Result<Vec<Task>> {
        let tasks = self.todos(Some(TaskStatus::Incomplete))?;
        Ok(filter_upcoming(tasks, today))
    }

    pub fn anytime(&self) -> Result<Vec<Task>> {
        self.query(
            &TaskQuery::todos()
                .with_status(TaskStatus::Incomplete)
                .with_start(StartBucket::Anytime),
        )
    }

    pub fn search(&self, search: &TaskSearch) -> Result<Vec<Task>> {
        let tasks = self.todos(None)?;
        Ok(tasks
            .into_iter()
            .filter(|task| matches_search(task, search))
            .collect())
    }

    /// Partial, case-insensitive title match over all to-dos
    pub fn find_by_title(&self, title: &str) -> Result<Vec<Task>> {
        let needle = title.to_lowercase();
        Ok(self
            .todos(None)?
            .into_iter()
            .filter(|task| task.title.to_lowercase().contains(&needle))
            .collect())
    }

    /// Incomplete projects with their to-dos, optionally in one area
    pub fn projects(&self, area: Option<&str>) -> Result<Vec<ProjectOverview>> {
        let filter = TaskQuery {
            kind: Some(TaskKind::Project),
            status: Some(TaskStatus::Incomplete),
            ..TaskQuery::default()
        };

        let mut overviews = Vec::new();
        for project in self.query(&filter)? {
            if let Some(area) = area {
                let in_area = project
                    .area
                    .as_ref()
                    .is_some_and(|item| item.title.eq_ignore_ascii_case(area));
                if !in_area {
                    continue;
                }
            }

            let todos = self.query(&TaskQuery {
                kind: Some(TaskKind::Todo),
                project_uuid: Some(project.uuid.clone()),
                ..TaskQuery::default()
            })?;
            overviews.push(ProjectOverview { project, todos });
        }
        Ok(overviews)
    }

    pub fn areas(&self) -> Result<Vec<Area>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, title FROM TMArea ORDER BY \"index\"")?;
        let areas = stmt
            .query_map([], |row| {
                Ok(Area {
                    uuid: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(areas)
    }

    pub fn tags(&self) -> Result<Vec<TagRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, title, shortcut FROM TMTag ORDER BY \"index\"")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(TagRecord {
                    uuid: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    shortcut: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Look up any item by uuid.
    ///
    /// Every failure (missing row, schema mismatch, IO) is reported as `None`.
    pub fn get(&self, uuid: &str) -> Option<Task> {
        match self.try_get(uuid) {
            Ok(task) => task,
            Err(error) => {
                tracing::debug!("Lookup of {} failed: {}", uuid, error);
                None
            }
        }
    }

    fn try_get(&self, uuid: &str) -> Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} AND t.uuid = ?1");
        let task = self
            .conn
            .query_row(&sql, params![uuid], Self::parse_task)
            .optional()?;
        let Some(task) = task else {
            return Ok(None);
        };

        let mut tasks = vec![task];
        self.attach_tags(&mut tasks)?;
        Ok(tasks.pop())
    }

    fn attach_tags(&self, tasks: &mut [Task]) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT tg.title FROM TMTaskTag tt JOIN TMTag tg ON tg.uuid = tt.tags \
             WHERE tt.tasks = ?1 ORDER BY tg.\"index\"",
        )?;
        for task in tasks.iter_mut() {
            task.tags = stmt
                .query_map(params![task.uuid], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }
        Ok(())
    }

    fn parse_task(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            uuid: row.get(0)?,
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            notes: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            kind: TaskKind::from_db(row.get(3)?),
            status: TaskStatus::from_db(row.get(4)?),
            start: StartBucket::from_db(row.get(5)?),
            start_date: row.get::<_, Option<i64>>(6)?.and_then(decode_packed_date),
            deadline: row.get::<_, Option<i64>>(7)?.and_then(decode_packed_date),
            today_index: row.get(8)?,
            project: item_ref(row.get(9)?, row.get(10)?),
            area: item_ref(row.get(11)?, row.get(12)?),
            tags: Vec::new(),
        })
    }
}

fn item_ref(uuid: Option<String>, title: Option<String>) -> Option<ItemRef> {
    uuid.map(|uuid| ItemRef {
        uuid,
        title: title.unwrap_or_default(),
    })
}

/// Scheduled on or before `today` and not in the inbox, ordered by Today index.
pub fn filter_today(tasks: Vec<Task>, today: NaiveDate) -> Vec<Task> {
    let mut selected = tasks
        .into_iter()
        .filter(|task| task.start != StartBucket::Inbox)
        .filter(|task| task.start_date.is_some_and(|date| date <= today))
        .collect::<Vec<_>>();
    selected.sort_by_key(|task| task.today_index.unwrap_or(i64::MAX));
    selected
}

/// Scheduled strictly after `today`, ordered by start date.
pub fn filter_upcoming(tasks: Vec<Task>, today: NaiveDate) -> Vec<Task> {
    let mut selected = tasks
        .into_iter()
        .filter(|task| task.start_date.is_some_and(|date| date > today))
        .collect::<Vec<_>>();
    selected.sort_by_key(|task| task.start_date);
    selected
}

pub fn matches_search(task: &Task, search: &TaskSearch) -> bool {
    let needle = search.query.to_lowercase();
    if !task.title.to_lowercase().contains(&needle) && !task.notes.to_lowercase().contains(&needle)
    {
        return false;
    }
    if search.status.is_some_and(|status| task.status != status) {
        return false;
    }
    if let Some(area) = &search.area {
        if !task
            .area
            .as_ref()
            .is_some_and(|item| item.title.eq_ignore_ascii_case(area))
        {
            return false;
        }
    }
    if let Some(project) = &search.project {
        if !task
            .project
            .as_ref()
            .is_some_and(|item| item.title.eq_ignore_ascii_case(project))
        {
            return false;
        }
    }
    if let Some(tag) = &search.tag {
        if !task.has_tag(tag) {
            return false;
        }
    }
    true
}

/// Resolve the database path: explicit, then `THINGS_DB_PATH`, then the
/// default macOS group container location.
pub fn resolve_database_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(|| std::env::var_os(DB_PATH_ENV_VAR).map(PathBuf::from))
        .or_else(default_database_path)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Could not locate the Things database. Set {DB_PATH_ENV_VAR} or pass --things-db."
            ))
        })
}

/// Locate `main.sqlite` inside the Things group container.
///
/// Newer releases nest the bundle in a `ThingsData-*` directory.
pub fn default_database_path() -> Option<PathBuf> {
    let container = dirs::home_dir()?.join(GROUP_CONTAINER);

    if let Ok(entries) = std::fs::read_dir(&container) {
        let mut candidates = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("ThingsData-"))
            })
            .map(|path| path.join(DATABASE_BUNDLE).join(DATABASE_FILE))
            .filter(|path| path.exists())
            .collect::<Vec<_>>();
        candidates.sort();
        if let Some(path) = candidates.into_iter().next() {
            return Some(path);
        }
    }

    let legacy = container.join(DATABASE_BUNDLE).join(DATABASE_FILE);
    legacy.exists().then_some(legacy)
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::path::Path;

    use chrono::NaiveDate;
    use rusqlite::{params, Connection};

    use crate::tasks::models::encode_packed_date;

    pub const SCHEMA: &str = r#"
        CREATE TABLE TMArea (uuid TEXT PRIMARY KEY, title TEXT, "index" INTEGER);
        CREATE TABLE TMTag (uuid TEXT PRIMARY KEY, title TEXT, shortcut TEXT, "index" INTEGER);
        CREATE TABLE TMTask (
            uuid TEXT PRIMARY KEY, title TEXT, notes TEXT, type INTEGER, status INTEGER,
            trashed INTEGER, start INTEGER, startDate INTEGER, deadline INTEGER,
            todayIndex INTEGER, "index" INTEGER, project TEXT, area TEXT, heading TEXT
        );
        CREATE TABLE TMTaskTag (tasks TEXT, tags TEXT);
    "#;

    pub fn date(year: i32, month: u32, day: u32) -> i64 {
        encode_packed_date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    /// Small library: one area, one project with a heading, a handful of to-dos.
    pub fn write_sample_database(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO TMArea VALUES ('area-work', 'Work', 1)",
            [],
        )
        .unwrap();
        conn.execute_batch(
            "INSERT INTO TMTag VALUES ('tag-urgent', 'Urgent', 'u', 1);
             INSERT INTO TMTag VALUES ('tag-home', 'Home', NULL, 2);",
        )
        .unwrap();

        let insert = "INSERT INTO TMTask (uuid, title, notes, type, status, trashed, start, \
                      startDate, deadline, todayIndex, \"index\", project, area, heading) \
                      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";
        let rows: Vec<(
            &str,
            &str,
            &str,
            i64,
            i64,
            i64,
            i64,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            i64,
            Option<&str>,
            Option<&str>,
            Option<&str>,
        )> = vec![
            ("proj-launch", "Launch site", "", 1, 0, 0, 1, None, None, None, 1, None, Some("area-work"), None),
            ("head-copy", "Copy", "", 2, 0, 0, 1, None, None, None, 2, Some("proj-launch"), None, None),
            ("todo-draft", "Draft landing copy", "hero section", 0, 0, 0, 1, Some(date(2024, 5, 1)), Some(date(2024, 5, 10)), Some(2), 3, None, None, Some("head-copy")),
            ("todo-deploy", "Deploy preview", "", 0, 3, 0, 1, None, None, None, 4, Some("proj-launch"), None, None),
            ("todo-milk", "Buy milk", "semi-skimmed", 0, 0, 0, 1, Some(date(2024, 4, 30)), None, Some(1), 5, None, None, None),
            ("todo-inbox", "Call plumber", "", 0, 0, 0, 0, None, None, None, 6, None, None, None),
            ("todo-later", "Renew passport", "", 0, 0, 0, 2, Some(date(2024, 6, 15)), None, None, 7, None, None, None),
            ("todo-soon", "Dentist", "", 0, 0, 0, 1, Some(date(2024, 5, 3)), None, None, 8, None, None, None),
            ("todo-old", "Old milk run", "", 0, 2, 0, 1, None, None, None, 9, None, None, None),
            ("todo-trash", "Trashed milk", "", 0, 0, 1, 1, None, None, None, 10, None, None, None),
        ];
        for row in rows {
            conn.execute(
                insert,
                params![
                    row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7, row.8, row.9,
                    row.10, row.11, row.12, row.13
                ],
            )
            .unwrap();
        }

        conn.execute_batch(
            "INSERT INTO TMTaskTag VALUES ('todo-draft', 'tag-urgent');
             INSERT INTO TMTaskTag VALUES ('todo-milk', 'tag-home');
             INSERT INTO TMTaskTag VALUES ('todo-milk', 'tag-urgent');",
        )
        .unwrap();
    }
}
