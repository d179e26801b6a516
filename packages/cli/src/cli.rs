use std::path::PathBuf;

use admin::entity::BadgeType;
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lms-admin", version)]
#[command(about = "Manage LMS courses, badges, trades and assignments")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store an API token for later commands
    Login {
        #[arg(long, env = "LMS_ADMIN_TOKEN")]
        token: String,
        #[arg(long)]
        username: Option<String>,
    },
    /// Forget the stored token
    Logout,
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },
    Badge {
        #[command(subcommand)]
        action: EntityAction<BadgeFields>,
    },
    Trade {
        #[command(subcommand)]
        action: EntityAction<TradeFields>,
    },
    Assignment {
        #[command(subcommand)]
        action: AssignmentAction,
    },
    Chapter {
        #[command(subcommand)]
        action: ChapterAction,
    },
}

#[derive(Subcommand)]
pub enum EntityAction<F: Args> {
    /// List records as a table
    List {
        /// Keep rows containing this text in any column
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one record
    Get { id: i32 },
    /// Create a record and upload its file
    Create {
        #[command(flatten)]
        fields: F,
        /// File to upload as the record's asset
        #[arg(long, alias = "image")]
        file: Option<PathBuf>,
    },
    /// Update fields and optionally replace the file
    Edit {
        id: i32,
        #[command(flatten)]
        fields: F,
        #[arg(long, alias = "image")]
        file: Option<PathBuf>,
    },
    /// Delete a record and its file
    Delete {
        id: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CourseAction {
    #[command(flatten)]
    Record(EntityAction<CourseFields>),
    /// List users enrolled in a course
    Users { id: i32 },
}

#[derive(Subcommand)]
pub enum AssignmentAction {
    #[command(flatten)]
    Record(EntityAction<AssignmentFields>),
    /// List submissions handed in for an assignment
    Responses {
        /// Assignment id
        id: i32,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Score a submission and leave feedback
    Grade {
        /// Submission id, as shown by `responses`
        id: i32,
        #[arg(long)]
        score: Option<i32>,
        #[arg(long)]
        feedback: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ChapterAction {
    List {
        /// Only chapters of this course
        #[arg(long)]
        course: Option<i32>,
        #[arg(long)]
        filter: Option<String>,
    },
    Get {
        id: i32,
    },
    Create {
        #[arg(long)]
        course_id: i32,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i32,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct CourseFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct BadgeFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type")]
    pub badge_type: Option<BadgeType>,
    #[arg(long)]
    pub course_id: Option<i32>,
    #[arg(long)]
    pub chapter_id: Option<i32>,
}

#[derive(Args)]
pub struct TradeFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub required_badge_type: Option<BadgeType>,
}

#[derive(Args)]
pub struct AssignmentFields {
    #[arg(long)]
    pub chapter_id: Option<i32>,
    #[arg(long)]
    pub instruction: Option<String>,
}
