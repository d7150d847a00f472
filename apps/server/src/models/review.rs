use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub dressmaker_id: Uuid,
    pub user_id: Uuid,
    pub grade: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReview {
    #[validate(range(min = 1.0, max = 5.0, message = "grade must be between 1 and 5"))]
    pub grade: f64,
    #[serde(default)]
    #[validate(length(min = 1, message = "comment is required"))]
    pub comment: String,
}

impl Review {
    pub fn new(dressmaker_id: Uuid, user_id: Uuid, input: CreateReview) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            dressmaker_id,
            user_id,
            grade: input.grade,
            comment: input.comment.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Mean of the review grades rounded to the nearest integer (half away from zero).
/// No reviews means a grade of zero.
pub fn average_grade<'a>(grades: impl IntoIterator<Item = &'a f64>) -> f64 {
    let (sum, count) = grades
        .into_iter()
        .fold((0.0, 0u32), |(sum, count), g| (sum + g, count + 1));
    if count == 0 {
        return 0.0;
    }
    (sum / f64::from(count)).round()
}
