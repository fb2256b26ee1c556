use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub project_id: Uuid,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub reviewer_role: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// 1 to 5; legacy rows may carry no rating at all.
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub review_type: Option<String>,
    /// Visible on the public portfolio page.
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewDraft {
    pub project_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_type: Option<String>,
    pub is_public: bool,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    #[default]
    Latest,
    Rating,
}

/// One page of reviews to fetch for a project.
#[derive(Debug, Clone)]
pub struct ReviewPageRequest {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub sort_by: ReviewSort,
    pub filter_type: Option<String>,
    pub min_rating: Option<i64>,
}

impl Default for ReviewPageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_by: ReviewSort::Latest,
            filter_type: None,
            min_rating: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPage {
    pub items: Vec<Review>,
    pub total: u64,
}

/// Aggregates computed client-side from a loaded review list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewStats {
    pub count: u64,
    /// Mean rating rounded to one decimal; missing ratings count as zero.
    pub average: f64,
    /// Counts per star, index 0 = one star. Out-of-range ratings clamp.
    pub distribution: [u64; 5],
}

impl ReviewStats {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let mut distribution = [0u64; 5];
        let mut sum: i64 = 0;
        for review in reviews {
            sum += review.rating.unwrap_or(0);
            if let Some(rating) = review.rating {
                let star = rating.clamp(1, 5) as usize;
                distribution[star - 1] += 1;
            }
        }
        let average = (sum as f64 / reviews.len() as f64 * 10.0).round() / 10.0;
        Self {
            count: reviews.len() as u64,
            average,
            distribution,
        }
    }
}
