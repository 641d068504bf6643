use serde::Serialize;

use super::StudentId;

/// Opaque category label shared by activities and coursework
pub type Category = String;

/// A surviving candidate annotated with the model's estimate
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub category: Category,
    pub estimated_rating: f64,
}

/// One entry of the activities path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: Category,
    pub predicted_rating: f64,
    pub relevant_activities: Vec<String>,
}

/// One entry of the webinar path; no rating attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebinarPick {
    pub category: Category,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecommendations {
    pub student_id: StudentId,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebinarRecommendations {
    pub success: bool,
    pub student_id: StudentId,
    pub recommended_webinars: Vec<WebinarPick>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_payload_shape() {
        let payload = ActivityRecommendations {
            student_id: StudentId::new("42"),
            recommendations: vec![Recommendation {
                category: "Arts".to_string(),
                predicted_rating: 4.25,
                relevant_activities: vec!["Batik Workshop".to_string()],
            }],
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "studentId": "42",
                "recommendations": [{
                    "category": "Arts",
                    "predictedRating": 4.25,
                    "relevantActivities": ["Batik Workshop"]
                }]
            })
        );
    }

    #[test]
    fn test_webinar_payload_shape() {
        let payload = WebinarRecommendations {
            success: true,
            student_id: StudentId::new("42"),
            recommended_webinars: vec![WebinarPick {
                category: "Seminar".to_string(),
                name: "Cloud Native Talk".to_string(),
            }],
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "success": true,
                "studentId": "42",
                "recommendedWebinars": [{"category": "Seminar", "name": "Cloud Native Talk"}]
            })
        );
    }
}
