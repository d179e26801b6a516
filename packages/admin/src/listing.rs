//! Table column definitions for entity listings, independent of how they are drawn.

use crate::entity::{
    AssetBacked, AssetRef, Assignment, Badge, Chapter, Course, Member, Submission, Trade,
};

/// What a row action button does, bound to the row it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Edit { id: i32 },
    Delete { id: i32, asset: AssetRef },
}

pub enum Column<R> {
    Field {
        title: &'static str,
        value: fn(&R) -> String,
    },
    Action {
        title: &'static str,
        action: fn(&R) -> RowAction,
    },
}

impl<R> Column<R> {
    pub fn title(&self) -> &'static str {
        match self {
            Column::Field { title, .. } | Column::Action { title, .. } => title,
        }
    }

    /// Rendered cell text; `None` for action columns.
    pub fn cell(&self, row: &R) -> Option<String> {
        match self {
            Column::Field { value, .. } => Some(value(row)),
            Column::Action { .. } => None,
        }
    }
}

/// Edit and delete actions for any asset-backed row.
pub fn row_actions<R: AssetBacked>() -> [Column<R>; 2] {
    [
        Column::Action {
            title: "Edit",
            action: |row| RowAction::Edit { id: row.id() },
        },
        Column::Action {
            title: "Delete",
            action: |row| RowAction::Delete {
                id: row.id(),
                asset: row.asset().clone(),
            },
        },
    ]
}

/// Keep the first `limit` words, marking the cut with `" ..."`.
pub fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return words.join(" ");
    }
    format!("{} ...", words[..limit].join(" "))
}

/// Rows whose field columns contain `query`, case-insensitively. An empty query keeps everything.
pub fn filter_rows<'a, R>(rows: &'a [R], query: &str, columns: &[Column<R>]) -> Vec<&'a R> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| {
            columns
                .iter()
                .filter_map(|c| c.cell(row))
                .any(|cell| cell.to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn course_columns() -> Vec<Column<Course>> {
    let mut columns = vec![
        Column::Field {
            title: "ID",
            value: |c: &Course| c.id.to_string(),
        },
        Column::Field {
            title: "Code",
            value: |c: &Course| c.code.clone(),
        },
        Column::Field {
            title: "Name",
            value: |c: &Course| c.name.clone(),
        },
        Column::Field {
            title: "Description",
            value: |c: &Course| truncate_words(&c.description, 10),
        },
        Column::Field {
            title: "Image",
            value: |c: &Course| c.image.to_string(),
        },
    ];
    columns.extend(row_actions());
    columns
}

pub fn badge_columns() -> Vec<Column<Badge>> {
    let mut columns = vec![
        Column::Field {
            title: "ID",
            value: |b: &Badge| b.id.to_string(),
        },
        Column::Field {
            title: "Name",
            value: |b: &Badge| truncate_words(&b.name, 5),
        },
        Column::Field {
            title: "Type",
            value: |b: &Badge| b.badge_type.to_string(),
        },
        Column::Field {
            title: "Course",
            value: |b: &Badge| b.course_id.to_string(),
        },
        Column::Field {
            title: "Chapter",
            value: |b: &Badge| b.chapter_id.to_string(),
        },
        Column::Field {
            title: "Image",
            value: |b: &Badge| b.image.to_string(),
        },
    ];
    columns.extend(row_actions());
    columns
}

pub fn trade_columns() -> Vec<Column<Trade>> {
    let mut columns = vec![
        Column::Field {
            title: "ID",
            value: |t: &Trade| t.id.to_string(),
        },
        Column::Field {
            title: "Title",
            value: |t: &Trade| t.title.clone(),
        },
        Column::Field {
            title: "Description",
            value: |t: &Trade| truncate_words(&t.description, 10),
        },
        Column::Field {
            title: "Required badge",
            value: |t: &Trade| t.required_badge_type.to_string(),
        },
        Column::Field {
            title: "Image",
            value: |t: &Trade| t.image.to_string(),
        },
    ];
    columns.extend(row_actions());
    columns
}

pub fn assignment_columns() -> Vec<Column<Assignment>> {
    let mut columns = vec![
        Column::Field {
            title: "ID",
            value: |a: &Assignment| a.id.to_string(),
        },
        Column::Field {
            title: "Chapter",
            value: |a: &Assignment| a.chapter_id.to_string(),
        },
        Column::Field {
            title: "Instruction",
            value: |a: &Assignment| truncate_words(&a.instruction, 8),
        },
        Column::Field {
            title: "File",
            value: |a: &Assignment| a.file_url.to_string(),
        },
    ];
    columns.extend(row_actions());
    columns
}

pub fn chapter_columns() -> Vec<Column<Chapter>> {
    vec![
        Column::Field {
            title: "ID",
            value: |c: &Chapter| c.id.to_string(),
        },
        Column::Field {
            title: "Course",
            value: |c: &Chapter| c.course_id.to_string(),
        },
        Column::Field {
            title: "Name",
            value: |c: &Chapter| c.name.clone(),
        },
        Column::Field {
            title: "Checkpoint",
            value: |c: &Chapter| match c.is_checkpoint {
                0 => "-".to_string(),
                level => level.to_string(),
            },
        },
    ]
}

pub fn member_columns() -> Vec<Column<Member>> {
    vec![
        Column::Field {
            title: "ID",
            value: |m: &Member| m.id.to_string(),
        },
        Column::Field {
            title: "Name",
            value: |m: &Member| m.name.clone(),
        },
        Column::Field {
            title: "Username",
            value: |m: &Member| m.username.clone(),
        },
        Column::Field {
            title: "Student ID",
            value: |m: &Member| m.student_id.clone().unwrap_or_else(|| "-".into()),
        },
        Column::Field {
            title: "Role",
            value: |m: &Member| m.role.to_string(),
        },
    ]
}

pub fn submission_columns() -> Vec<Column<Submission>> {
    vec![
        Column::Field {
            title: "ID",
            value: |s: &Submission| s.id.to_string(),
        },
        Column::Field {
            title: "Student",
            value: |s: &Submission| s.user.as_ref().map_or("-".into(), |u| u.name.clone()),
        },
        Column::Field {
            title: "Student ID",
            value: |s: &Submission| {
                s.user
                    .as_ref()
                    .and_then(|u| u.student_id.clone())
                    .unwrap_or_else(|| "-".into())
            },
        },
        Column::Field {
            title: "Submission",
            value: |s: &Submission| s.submission.clone().unwrap_or_else(|| "-".into()),
        },
        Column::Field {
            title: "Score",
            value: |s: &Submission| {
                s.assignment_score
                    .map_or("ungraded".into(), |score| score.to_string())
            },
        },
        Column::Field {
            title: "Feedback",
            value: |s: &Submission| {
                truncate_words(s.assignment_feedback.as_deref().unwrap_or_default(), 8)
            },
        },
    ]
}
