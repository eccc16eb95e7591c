use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Grammar lessons with scored checks, unlocks and XP, played in the terminal.
#[derive(Parser, Debug)]
#[command(name = "lessons", version, about, long_about = None)]
pub struct Cli {
    /// SQLite database for learner progress (plain paths are accepted)
    #[arg(
        long = "db",
        env = "LESSONS_DB_URL",
        default_value = "sqlite://lessons.sqlite3",
        global = true
    )]
    pub db_url: String,

    /// Lesson catalog JSON (`{ "lessons": [...] }`)
    #[arg(long, env = "LESSONS_CATALOG", default_value = "lessons.json", global = true)]
    pub catalog: PathBuf,

    /// Key namespace for stored progress
    #[arg(long, env = "LESSONS_NAMESPACE", default_value = "a2", global = true)]
    pub namespace: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List lessons with lock and completion markers
    #[command(visible_alias = "ls")]
    List,

    /// Work through a lesson, reading answers from stdin
    Run {
        /// Lesson slug
        lesson: String,
        /// Race the lesson's countdown; time-up scores what is answered
        #[arg(long)]
        challenge: bool,
        /// Override the countdown length in seconds
        #[arg(long, requires = "challenge")]
        seconds: Option<u32>,
    },

    /// Show stored progress and the last result for a lesson
    Progress {
        /// Lesson slug
        lesson: String,
    },

    /// Show the XP total
    Xp,

    /// Report authoring problems in the catalog
    Validate,

    /// Print the catalog index as JSON
    Index,

    /// Show or toggle completed vocabulary terms
    Vocab {
        level: String,
        category: String,
        /// Term to mark or unmark as learned
        #[arg(long)]
        toggle: Option<String>,
        /// Number of words in the list, for a completion percentage
        #[arg(long)]
        total: Option<usize>,
    },
}
