//! Parameterized statements issued by the service.
//!
//! Expected relations:
//! - `student_activities(student_id, activity_name, category)`: activity records,
//!   also the catalogue of offered activities
//! - `enrollments(student_id, course_category, course_credits)`: coursework taken
//! - `students(student_id, name, program, cohort, status, gpa, password_hash)`

pub const ACTIVITY_CATEGORIES: &str = r#"
    SELECT DISTINCT category
    FROM student_activities
    WHERE category IS NOT NULL
    ORDER BY category
"#;

pub const TAKEN_CATEGORIES: &str = r#"
    SELECT course_category
    FROM enrollments
    WHERE student_id = $1 AND course_category IS NOT NULL
"#;

pub const EXAMPLE_ACTIVITIES: &str =
    "SELECT activity_name FROM student_activities WHERE category = $1 LIMIT $2";

/// Union of offered categories and the student's own coursework categories
pub const WEBINAR_CATEGORIES: &str = r#"
    SELECT DISTINCT category FROM student_activities
    WHERE category IS NOT NULL
    UNION
    SELECT DISTINCT course_category FROM enrollments
    WHERE student_id = $1 AND course_category IS NOT NULL
"#;

pub const RANDOM_ACTIVITY_IN_CATEGORY: &str = r#"
    SELECT activity_name, category
    FROM student_activities
    WHERE category = $1
    ORDER BY RANDOM()
    LIMIT 1
"#;

pub const STUDENT_ACTIVITIES: &str = r#"
    SELECT DISTINCT activity_name, category
    FROM student_activities
    WHERE student_id = $1
    LIMIT $2
"#;

pub const STUDENT_PROFILE: &str = r#"
    SELECT name, program, student_id, status
    FROM students
    WHERE student_id = $1
"#;

pub const STUDENT_DETAIL: &str = r#"
    SELECT name, student_id, program, cohort, status, gpa
    FROM students
    WHERE student_id = $1
"#;

pub const CREDIT_TOTAL: &str =
    "SELECT SUM(course_credits) AS credits FROM enrollments WHERE student_id = $1";

pub const STUDENT_CREDENTIALS: &str =
    "SELECT student_id, name, password_hash FROM students WHERE student_id = $1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookups_skip_null_labels() {
        assert!(ACTIVITY_CATEGORIES.contains("category IS NOT NULL"));
        assert!(TAKEN_CATEGORIES.contains("course_category IS NOT NULL"));
        assert!(WEBINAR_CATEGORIES.contains("WHERE category IS NOT NULL"));
        assert!(WEBINAR_CATEGORIES.contains("course_category IS NOT NULL"));
    }
}
