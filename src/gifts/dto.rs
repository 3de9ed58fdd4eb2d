use serde::{Deserialize, Serialize};

use crate::gifts::repo_types::Gift;

/// Query string of `GET /api/search`. Everything arrives as text and is
/// interpreted by [`GiftFilter::from_params`](super::filter::GiftFilter::from_params).
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub age_years: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub gifts: Vec<Gift>,
}
