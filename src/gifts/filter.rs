use crate::error::{ApiError, FieldError};
use crate::gifts::dto::SearchParams;
use crate::gifts::repo_types::Gift;

/// Search predicate over gift documents. Each `Some` field narrows the
/// result; an empty filter matches everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GiftFilter {
    /// Case-insensitive substring of `name`.
    pub name: Option<String>,
    /// Exact `category`.
    pub category: Option<String>,
    /// Exact `condition`.
    pub condition: Option<String>,
    /// Upper bound (inclusive) on numeric `age_years`.
    pub max_age_years: Option<f64>,
}

impl GiftFilter {
    pub fn from_params(params: &SearchParams) -> Result<Self, ApiError> {
        let name = params
            .name
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let category = non_empty(&params.category);
        let condition = non_empty(&params.condition);

        let max_age_years = match non_empty(&params.age_years) {
            None => None,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    return Err(ApiError::Validation(vec![FieldError::query(
                        "age_years",
                        "age_years must be a number",
                    )]))
                }
            },
        };

        Ok(Self {
            name,
            category,
            condition,
            max_age_years,
        })
    }

    pub fn matches(&self, gift: &Gift) -> bool {
        if let Some(needle) = &self.name {
            let Some(name) = gift.str_field("name") else {
                return false;
            };
            if !name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if gift.str_field("category") != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(condition) = &self.condition {
            if gift.str_field("condition") != Some(condition.as_str()) {
                return false;
            }
        }
        if let Some(max) = self.max_age_years {
            match gift.number_field("age_years") {
                Some(age) if age <= max => {}
                _ => return false,
            }
        }
        true
    }
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gift(v: serde_json::Value) -> Gift {
        Gift::from_value(v).unwrap()
    }

    fn params(name: Option<&str>, category: Option<&str>, condition: Option<&str>, age: Option<&str>) -> SearchParams {
        SearchParams {
            name: name.map(Into::into),
            category: category.map(Into::into),
            condition: condition.map(Into::into),
            age_years: age.map(Into::into),
        }
    }

    #[test]
    fn absent_and_blank_params_impose_nothing() {
        let f = GiftFilter::from_params(&params(Some("   "), Some(""), None, Some(""))).unwrap();
        assert_eq!(f, GiftFilter::default());
        assert!(f.matches(&gift(json!({}))));
    }

    #[test]
    fn name_is_case_insensitive_substring() {
        let f = GiftFilter::from_params(&params(Some("bike"), None, None, None)).unwrap();
        assert!(f.matches(&gift(json!({"name": "Kids BIKE with bell"}))));
        assert!(f.matches(&gift(json!({"name": "bike"}))));
        assert!(!f.matches(&gift(json!({"name": "Scooter"}))));
        assert!(!f.matches(&gift(json!({"category": "bike"}))));
    }

    #[test]
    fn name_is_literal_not_a_pattern() {
        let f = GiftFilter::from_params(&params(Some("b.ke"), None, None, None)).unwrap();
        assert!(!f.matches(&gift(json!({"name": "bike"}))));
        assert!(f.matches(&gift(json!({"name": "B.KE stand"}))));
    }

    #[test]
    fn category_and_condition_match_exactly() {
        let f = GiftFilter::from_params(&params(None, Some("toys"), Some("New"), None)).unwrap();
        assert!(f.matches(&gift(json!({"category": "toys", "condition": "New"}))));
        assert!(!f.matches(&gift(json!({"category": "Toys", "condition": "New"}))));
        assert!(!f.matches(&gift(json!({"category": "toys and games", "condition": "New"}))));
        assert!(!f.matches(&gift(json!({"category": "toys", "condition": "Like New"}))));
    }

    #[test]
    fn age_is_an_inclusive_upper_bound() {
        let f = GiftFilter::from_params(&params(None, None, None, Some("3"))).unwrap();
        assert_eq!(f.max_age_years, Some(3.0));
        assert!(f.matches(&gift(json!({"age_years": 3}))));
        assert!(f.matches(&gift(json!({"age_years": 0.5}))));
        assert!(!f.matches(&gift(json!({"age_years": 4}))));
        assert!(!f.matches(&gift(json!({"age_years": "2"}))));
        assert!(!f.matches(&gift(json!({}))));
    }

    #[test]
    fn non_numeric_age_is_rejected() {
        let err = GiftFilter::from_params(&params(None, None, None, Some("three"))).unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors[0].path, "age_years"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
