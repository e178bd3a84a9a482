use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use margin_core::tasks::{GroupBy, TaskStatus};

#[derive(Parser)]
#[command(name = "margin")]
#[command(about = "Import Readwise highlights and drive Things tasks from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Readwise secrets file (default: ~/.config/margin/readwise.env)
    #[arg(long, global = true, value_name = "PATH")]
    pub secrets_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the Readwise API token is valid
    Auth,
    /// Search the Readwise library by title or author
    Search {
        /// Search query (title or author)
        #[arg(long, short)]
        query: String,
        /// Filter by category
        #[arg(long, value_enum)]
        category: Option<ReadwiseCategory>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a book or article as a Markdown source document
    Import {
        /// Readwise book ID
        #[arg(long, value_name = "ID")]
        book_id: u64,
        /// Directory for the new source document
        #[arg(long, value_name = "DIR")]
        output_dir: PathBuf,
    },
    /// Refresh an imported source document with its latest highlights
    Sync {
        /// Path to the existing source document
        #[arg(long, value_name = "PATH")]
        filepath: PathBuf,
    },
    /// Fetch the raw content of a highlight's source URL
    Fetch {
        /// URL to fetch
        #[arg(long)]
        url: String,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Read and update the Things task store
    Tasks {
        /// Things database file (default: THINGS_DB_PATH or the Things container)
        #[arg(long, global = true, value_name = "PATH")]
        things_db: Option<PathBuf>,
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReadwiseCategory {
    Books,
    Articles,
    Tweets,
    Podcasts,
    Supplementals,
    Videos,
}

impl ReadwiseCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Articles => "articles",
            Self::Tweets => "tweets",
            Self::Podcasts => "podcasts",
            Self::Supplementals => "supplementals",
            Self::Videos => "videos",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    Incomplete,
    Completed,
    Canceled,
}

impl From<StatusArg> for TaskStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Incomplete => Self::Incomplete,
            StatusArg::Completed => Self::Completed,
            StatusArg::Canceled => Self::Canceled,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum GroupByArg {
    Project,
    Area,
    Tag,
}

impl From<GroupByArg> for GroupBy {
    fn from(group_by: GroupByArg) -> Self {
        match group_by {
            GroupByArg::Project => Self::Project,
            GroupByArg::Area => Self::Area,
            GroupByArg::Tag => Self::Tag,
        }
    }
}

/// Output switches shared by every task listing
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ListView {
    /// Show notes, tags, project, area and dates
    #[arg(short, long)]
    pub verbose: bool,
    /// Show item UUIDs
    #[arg(long)]
    pub uuid: bool,
    /// Group output
    #[arg(long, value_enum)]
    pub group_by: Option<GroupByArg>,
    /// Append a status summary
    #[arg(long)]
    pub summary: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Fields shared by `add` and `add-project`
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Notes
    #[arg(long)]
    pub notes: Option<String>,
    /// today, tomorrow, evening, anytime, someday or YYYY-MM-DD
    #[arg(long)]
    pub when: Option<String>,
    /// Deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<String>,
    /// Tag names (repeatable or comma-separated)
    #[arg(long = "tag", value_delimiter = ',')]
    pub tags: Vec<String>,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// To-dos in the Today list
    Today {
        #[command(flatten)]
        view: ListView,
    },
    /// To-dos in the Inbox
    Inbox {
        #[command(flatten)]
        view: ListView,
    },
    /// To-dos scheduled after today
    Upcoming {
        #[command(flatten)]
        view: ListView,
    },
    /// To-dos in the Anytime list
    Anytime {
        #[command(flatten)]
        view: ListView,
    },
    /// All to-dos, optionally filtered by status
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[command(flatten)]
        view: ListView,
    },
    /// Search to-do titles and notes
    Search {
        /// Search text
        query: String,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Area name
        #[arg(long)]
        area: Option<String>,
        /// Project name
        #[arg(long)]
        project: Option<String>,
        /// Tag name
        #[arg(long)]
        tag: Option<String>,
        #[command(flatten)]
        view: ListView,
    },
    /// Find to-dos by partial title
    Find {
        title: String,
        #[command(flatten)]
        view: ListView,
    },
    /// Incomplete projects with progress
    Projects {
        /// Area name
        #[arg(long)]
        area: Option<String>,
        /// Include each project's to-dos
        #[arg(long)]
        include_tasks: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// All areas
    Areas {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// All tags
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one item by UUID
    Get {
        uuid: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a to-do
    Add {
        title: String,
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// Project or area name
        #[arg(long)]
        list: Option<String>,
        /// Heading inside the project
        #[arg(long)]
        heading: Option<String>,
        /// Checklist item (repeatable)
        #[arg(long = "checklist-item")]
        checklist_items: Vec<String>,
    },
    /// Create a project
    AddProject {
        title: String,
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// Area name
        #[arg(long)]
        area: Option<String>,
        /// To-do title (repeatable)
        #[arg(long = "todo")]
        todos: Vec<String>,
    },
    /// Update an existing item (requires auth token)
    Update {
        uuid: String,
        #[arg(long)]
        title: Option<String>,
        /// Replace notes
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        prepend_notes: Option<String>,
        #[arg(long)]
        append_notes: Option<String>,
        #[arg(long)]
        when: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        /// Replace tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },
    /// Mark an item completed (requires auth token)
    Complete { uuid: String },
    /// Mark an item canceled (requires auth token)
    Cancel { uuid: String },
    /// Open a list (today, inbox, upcoming, ...) or item in Things
    Show { id: String },
    /// Open the Things search window
    Open { query: String },
    /// Save the Things URL auth token
    SetToken { token: String },
}
