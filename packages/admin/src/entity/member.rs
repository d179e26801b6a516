use std::fmt;

use serde::{Deserialize, Serialize};

use super::string_or_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Student,
    Instructor,
    #[serde(other)]
    Other,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "ADMIN",
            Role::Student => "STUDENT",
            Role::Instructor => "INSTRUCTOR",
            Role::Other => "-",
        })
    }
}

/// A user enrolled in a course, as returned by `/course/{id}/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i32,
    #[serde(default)]
    pub username: String,
    pub name: String,
    pub role: Role,
    #[serde(default, deserialize_with = "string_or_number")]
    pub student_id: Option<String>,
}
