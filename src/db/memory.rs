use rand::seq::SliceRandom;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::{
    db::{
        queries,
        store::{ConnectionSource, Param, Query, Row, StoreConnection},
    },
    error::StoreError,
};

#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub student_id: String,
    pub activity_name: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct EnrollmentRecord {
    pub student_id: String,
    pub course_category: String,
    pub course_credits: i64,
}

#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub student_id: String,
    pub name: String,
    pub program: String,
    pub cohort: i64,
    pub status: String,
    pub gpa: f64,
    pub password_hash: String,
}

#[derive(Default)]
struct Tables {
    activities: Vec<ActivityRecord>,
    enrollments: Vec<EnrollmentRecord>,
    students: Vec<StudentRecord>,
}

#[derive(Default)]
struct Inner {
    tables: RwLock<Tables>,
    failures: Mutex<VecDeque<StoreError>>,
    opened: AtomicU32,
    closed: AtomicU32,
    statements: AtomicU32,
}

/// In-process store answering the statements in [`queries`]
///
/// Store fake for unit and integration tests (`test-util` feature): it
/// counts opened and closed connections and can be told to fail the next
/// statements.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity(self, student_id: &str, activity_name: &str, category: &str) -> Self {
        self.write_tables(|t| {
            t.activities.push(ActivityRecord {
                student_id: student_id.to_string(),
                activity_name: activity_name.to_string(),
                category: category.to_string(),
            })
        });
        self
    }

    pub fn with_enrollment(self, student_id: &str, course_category: &str, credits: i64) -> Self {
        self.write_tables(|t| {
            t.enrollments.push(EnrollmentRecord {
                student_id: student_id.to_string(),
                course_category: course_category.to_string(),
                course_credits: credits,
            })
        });
        self
    }

    pub fn with_student(self, student: StudentRecord) -> Self {
        self.write_tables(|t| t.students.push(student));
        self
    }

    /// Queue failures handed to the next statements, one per statement
    pub fn fail_next(&self, errors: impl IntoIterator<Item = StoreError>) {
        if let Ok(mut failures) = self.inner.failures.lock() {
            failures.extend(errors);
        }
    }

    pub fn opened(&self) -> u32 {
        self.inner.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> u32 {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Statements that reached the tables (injected failures included)
    pub fn statements(&self) -> u32 {
        self.inner.statements.load(Ordering::SeqCst)
    }

    fn write_tables(&self, f: impl FnOnce(&mut Tables)) {
        if let Ok(mut tables) = self.inner.tables.write() {
            f(&mut tables);
        }
    }
}

#[async_trait::async_trait]
impl ConnectionSource for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            inner: self.inner.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct MemoryConnection {
    inner: Arc<Inner>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.inner.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl StoreConnection for MemoryConnection {
    async fn fetch_all(&mut self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.inner.statements.fetch_add(1, Ordering::SeqCst);

        let injected = self
            .inner
            .failures
            .lock()
            .map_err(|_| StoreError::Permanent("failure queue poisoned".to_string()))?
            .pop_front();
        if let Some(error) = injected {
            return Err(error);
        }

        let tables = self
            .inner
            .tables
            .read()
            .map_err(|_| StoreError::Permanent("tables poisoned".to_string()))?;
        run(&tables, query)
    }
}

fn run(tables: &Tables, query: &Query) -> Result<Vec<Row>, StoreError> {
    let rows = match query.sql {
        queries::ACTIVITY_CATEGORIES => {
            let categories: BTreeSet<&str> =
                tables.activities.iter().map(|a| a.category.as_str()).collect();
            categories
                .into_iter()
                .map(|c| Row::new().with("category", c))
                .collect()
        }
        queries::TAKEN_CATEGORIES => {
            let student = text_param(query, 0)?;
            tables
                .enrollments
                .iter()
                .filter(|e| e.student_id == student)
                .map(|e| Row::new().with("course_category", e.course_category.as_str()))
                .collect()
        }
        queries::EXAMPLE_ACTIVITIES => {
            let category = text_param(query, 0)?;
            let limit = int_param(query, 1)?;
            tables
                .activities
                .iter()
                .filter(|a| a.category == category)
                .take(limit)
                .map(|a| Row::new().with("activity_name", a.activity_name.as_str()))
                .collect()
        }
        queries::WEBINAR_CATEGORIES => {
            let student = text_param(query, 0)?;
            let categories: BTreeSet<&str> = tables
                .activities
                .iter()
                .map(|a| a.category.as_str())
                .chain(
                    tables
                        .enrollments
                        .iter()
                        .filter(|e| e.student_id == student)
                        .map(|e| e.course_category.as_str()),
                )
                .collect();
            categories
                .into_iter()
                .map(|c| Row::new().with("category", c))
                .collect()
        }
        queries::RANDOM_ACTIVITY_IN_CATEGORY => {
            let category = text_param(query, 0)?;
            let matching: Vec<&ActivityRecord> = tables
                .activities
                .iter()
                .filter(|a| a.category == category)
                .collect();
            matching
                .choose(&mut rand::thread_rng())
                .map(|a| {
                    Row::new()
                        .with("activity_name", a.activity_name.as_str())
                        .with("category", a.category.as_str())
                })
                .into_iter()
                .collect()
        }
        queries::STUDENT_ACTIVITIES => {
            let student = text_param(query, 0)?;
            let limit = int_param(query, 1)?;
            let mut seen = HashSet::new();
            tables
                .activities
                .iter()
                .filter(|a| a.student_id == student)
                .filter(|a| seen.insert((a.activity_name.as_str(), a.category.as_str())))
                .take(limit)
                .map(|a| {
                    Row::new()
                        .with("activity_name", a.activity_name.as_str())
                        .with("category", a.category.as_str())
                })
                .collect()
        }
        queries::STUDENT_PROFILE | queries::STUDENT_DETAIL | queries::STUDENT_CREDENTIALS => {
            let student = text_param(query, 0)?;
            tables
                .students
                .iter()
                .filter(|s| s.student_id == student)
                .map(|s| student_row(s, query.sql))
                .collect()
        }
        queries::CREDIT_TOTAL => {
            let student = text_param(query, 0)?;
            let credits: Vec<i64> = tables
                .enrollments
                .iter()
                .filter(|e| e.student_id == student)
                .map(|e| e.course_credits)
                .collect();
            let total = if credits.is_empty() {
                Value::Null
            } else {
                Value::from(credits.iter().sum::<i64>())
            };
            vec![Row::new().with("credits", total)]
        }
        other => {
            return Err(StoreError::Permanent(format!(
                "unsupported statement: {}",
                other.trim()
            )))
        }
    };

    Ok(rows)
}

fn student_row(student: &StudentRecord, sql: &str) -> Row {
    let row = Row::new()
        .with("student_id", student.student_id.as_str())
        .with("name", student.name.as_str());

    match sql {
        queries::STUDENT_CREDENTIALS => row.with("password_hash", student.password_hash.as_str()),
        queries::STUDENT_DETAIL => row
            .with("program", student.program.as_str())
            .with("status", student.status.as_str())
            .with("cohort", student.cohort)
            .with("gpa", student.gpa),
        _ => row
            .with("program", student.program.as_str())
            .with("status", student.status.as_str()),
    }
}

fn text_param(query: &Query, index: usize) -> Result<&str, StoreError> {
    match query.params.get(index) {
        Some(Param::Text(value)) => Ok(value),
        other => Err(StoreError::Permanent(format!(
            "parameter ${} expected text, found {:?}",
            index + 1,
            other
        ))),
    }
}

fn int_param(query: &Query, index: usize) -> Result<usize, StoreError> {
    match query.params.get(index) {
        Some(Param::Int(value)) if *value >= 0 => Ok(*value as usize),
        other => Err(StoreError::Permanent(format!(
            "parameter ${} expected non-negative integer, found {:?}",
            index + 1,
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Catalog, QueryExecutor, RetryPolicy};
    use crate::error::AppError;
    use crate::models::StudentId;
    use std::time::Duration;

    fn catalog(store: &MemoryStore) -> Catalog {
        Catalog::new(QueryExecutor::new(
            Arc::new(store.clone()),
            RetryPolicy::new(3, Duration::from_millis(1)),
        ))
    }

    fn sample_store() -> MemoryStore {
        MemoryStore::new()
            .with_activity("s1", "Chess Tournament", "Sports")
            .with_activity("s2", "Batik Workshop", "Arts")
            .with_activity("s2", "Batik Workshop", "Arts")
            .with_activity("s3", "AI Seminar", "Seminar")
            .with_enrollment("s1", "Sports", 3)
            .with_enrollment("s1", "Programming", 4)
            .with_student(StudentRecord {
                student_id: "s1".to_string(),
                name: "Ayu".to_string(),
                program: "Informatics".to_string(),
                cohort: 2021,
                status: "active".to_string(),
                gpa: 3.5,
                password_hash: "hash".to_string(),
            })
    }

    #[tokio::test]
    async fn test_activity_categories_are_distinct() {
        let store = sample_store();
        let categories = catalog(&store).activity_categories().await.unwrap();
        assert_eq!(categories, vec!["Arts", "Seminar", "Sports"]);
    }

    #[tokio::test]
    async fn test_webinar_categories_include_coursework() {
        let store = sample_store();
        let categories = catalog(&store)
            .webinar_categories(&StudentId::new("s1"))
            .await
            .unwrap();
        assert_eq!(categories, vec!["Arts", "Programming", "Seminar", "Sports"]);
    }

    #[tokio::test]
    async fn test_student_lookups() {
        let store = sample_store();
        let catalog = catalog(&store);
        let s1 = StudentId::new("s1");

        let taken = catalog.taken_categories(&s1).await.unwrap();
        assert!(taken.contains("Sports") && taken.contains("Programming"));

        assert_eq!(catalog.credit_total(&s1).await.unwrap(), Some(7.0));
        assert_eq!(
            catalog.credit_total(&StudentId::new("nobody")).await.unwrap(),
            None
        );

        let detail = catalog.student_detail(&s1).await.unwrap().unwrap();
        assert_eq!(detail.profile.name, "Ayu");
        assert_eq!(detail.cohort, Some(2021));

        let activities = catalog
            .student_activities(&StudentId::new("s2"), 6)
            .await
            .unwrap();
        assert_eq!(activities.len(), 1);

        assert!(catalog
            .student_profile(&StudentId::new("nobody"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_random_draw_stays_in_category() {
        let store = sample_store();
        let pick = catalog(&store).random_activity_in("Arts").await.unwrap().unwrap();
        assert_eq!(pick.category, "Arts");
        assert_eq!(pick.name, "Batik Workshop");

        let none = catalog(&store).random_activity_in("Music").await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_every_connection_is_released() {
        let store = sample_store();
        store.fail_next([StoreError::Transient("blip".into())]);

        catalog(&store).activity_categories().await.unwrap();

        assert_eq!(store.opened(), 2);
        assert_eq!(store.closed(), 2);
    }

    #[tokio::test]
    async fn test_unknown_statement_is_permanent() {
        let store = MemoryStore::new();
        let executor = QueryExecutor::new(Arc::new(store.clone()), RetryPolicy::default());

        let result = executor.fetch_all(&Query::new("bogus", "SELECT 1")).await;

        assert!(matches!(
            result,
            Err(AppError::DataAccess { attempts: 1, .. })
        ));
    }
}
