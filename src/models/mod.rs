use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{db::store::Row, error::AppError};

pub mod recommendation;

pub use recommendation::{
    ActivityRecommendations, CandidateScore, Category, Recommendation, WebinarPick,
    WebinarRecommendations,
};

/// Opaque student key as vouched for by the token authority
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An activity the student has already taken part in
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentActivity {
    pub activity_name: String,
    pub category: Category,
}

impl TryFrom<&Row> for StudentActivity {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            activity_name: row.text("activity_name")?,
            category: row.text("category")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub name: String,
    pub program: String,
    pub status: String,
}

impl TryFrom<&Row> for StudentProfile {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: StudentId::new(row.text("student_id")?),
            name: row.text("name")?,
            program: row.text("program")?,
            status: row.text("status")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub cohort: Option<i64>,
    pub gpa: Option<f64>,
}

impl TryFrom<&Row> for StudentDetail {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            profile: StudentProfile::try_from(row)?,
            cohort: row.number("cohort")?.map(|c| c as i64),
            gpa: row.number("gpa")?,
        })
    }
}

/// Login material; never serialized back to clients
#[derive(Debug, Clone)]
pub struct StudentCredentials {
    pub student_id: StudentId,
    pub name: String,
    pub password_hash: String,
}

impl TryFrom<&Row> for StudentCredentials {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: StudentId::new(row.text("student_id")?),
            name: row.text("name")?,
            password_hash: row.text("password_hash")?,
        })
    }
}
