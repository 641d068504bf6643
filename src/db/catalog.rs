use std::collections::HashSet;

use crate::{
    db::{
        executor::QueryExecutor,
        queries,
        store::{Query, Row},
    },
    error::AppResult,
    models::{
        Category, StudentActivity, StudentCredentials, StudentDetail, StudentId, StudentProfile,
        WebinarPick,
    },
};

/// Typed lookups over the resilient executor
///
/// Every method is a single statement run through [`QueryExecutor::fetch_all`],
/// so each inherits the retry budget and per-attempt connection scoping.
#[derive(Clone)]
pub struct Catalog {
    executor: QueryExecutor,
}

impl Catalog {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Every category that has at least one offered activity
    pub async fn activity_categories(&self) -> AppResult<Vec<Category>> {
        let query = Query::new("activity_categories", queries::ACTIVITY_CATEGORIES);
        let rows = self.executor.fetch_all(&query).await?;
        column(&rows, "category")
    }

    /// Coursework categories the student has already taken
    pub async fn taken_categories(&self, student: &StudentId) -> AppResult<HashSet<Category>> {
        let query = Query::new("taken_categories", queries::TAKEN_CATEGORIES).bind(student.as_str());
        let rows = self.executor.fetch_all(&query).await?;
        Ok(column(&rows, "course_category")?.into_iter().collect())
    }

    /// Up to `limit` activity names filed under `category`
    pub async fn example_activities(&self, category: &str, limit: usize) -> AppResult<Vec<String>> {
        let query = Query::new("example_activities", queries::EXAMPLE_ACTIVITIES)
            .bind(category)
            .bind(limit as i64);
        let rows = self.executor.fetch_all(&query).await?;
        column(&rows, "activity_name")
    }

    /// Offered categories together with the student's coursework categories
    pub async fn webinar_categories(&self, student: &StudentId) -> AppResult<Vec<Category>> {
        let query =
            Query::new("webinar_categories", queries::WEBINAR_CATEGORIES).bind(student.as_str());
        let rows = self.executor.fetch_all(&query).await?;
        column(&rows, "category")
    }

    /// One activity drawn at random by the store from `category`
    pub async fn random_activity_in(&self, category: &str) -> AppResult<Option<WebinarPick>> {
        let query = Query::new("random_activity_in_category", queries::RANDOM_ACTIVITY_IN_CATEGORY)
            .bind(category);
        let rows = self.executor.fetch_all(&query).await?;

        match rows.first() {
            Some(row) => Ok(Some(WebinarPick {
                category: row.text("category")?,
                name: row.text("activity_name")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn student_activities(
        &self,
        student: &StudentId,
        limit: usize,
    ) -> AppResult<Vec<StudentActivity>> {
        let query = Query::new("student_activities", queries::STUDENT_ACTIVITIES)
            .bind(student.as_str())
            .bind(limit as i64);
        let rows = self.executor.fetch_all(&query).await?;
        rows.iter().map(StudentActivity::try_from).collect()
    }

    pub async fn student_profile(&self, student: &StudentId) -> AppResult<Option<StudentProfile>> {
        let query = Query::new("student_profile", queries::STUDENT_PROFILE).bind(student.as_str());
        let rows = self.executor.fetch_all(&query).await?;
        rows.first().map(StudentProfile::try_from).transpose()
    }

    pub async fn student_detail(&self, student: &StudentId) -> AppResult<Option<StudentDetail>> {
        let query = Query::new("student_detail", queries::STUDENT_DETAIL).bind(student.as_str());
        let rows = self.executor.fetch_all(&query).await?;
        rows.first().map(StudentDetail::try_from).transpose()
    }

    /// Sum of enrolled course credits, `None` when the student has no enrollments
    pub async fn credit_total(&self, student: &StudentId) -> AppResult<Option<f64>> {
        let query = Query::new("credit_total", queries::CREDIT_TOTAL).bind(student.as_str());
        let rows = self.executor.fetch_all(&query).await?;
        match rows.first() {
            Some(row) => row.number("credits"),
            None => Ok(None),
        }
    }

    pub async fn student_credentials(
        &self,
        student: &StudentId,
    ) -> AppResult<Option<StudentCredentials>> {
        let query =
            Query::new("student_credentials", queries::STUDENT_CREDENTIALS).bind(student.as_str());
        let rows = self.executor.fetch_all(&query).await?;
        rows.first().map(StudentCredentials::try_from).transpose()
    }
}

fn column(rows: &[Row], name: &str) -> AppResult<Vec<String>> {
    rows.iter().map(|row| row.text(name)).collect()
}
