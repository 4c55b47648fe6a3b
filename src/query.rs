use serde::Deserialize;
use std::cmp::Ordering;
use utoipa::IntoParams;

use crate::catalog::Fixture;

/// Placeholder values the listing page sends for "no filter"
const ALL_VENUES: &str = "All Venues";
const ALL_COMPETITIONS: &str = "All Competitions";

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Query parameters extracted from HTTP request
/// All fields are optional to support flexible querying
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchQueryParams {
    /// Case-insensitive search over teams, city, stadium and competition
    pub search: Option<String>,
    /// Exact stadium name
    pub venue: Option<String>,
    /// Exact competition name
    pub competition: Option<String>,
    /// Sort field: "date", "price" or "venue"
    pub sort: Option<String>,
    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, at most 100)
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Price,
    Venue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedMatchQuery {
    /// Lowercased search term (None if blank)
    pub search: Option<String>,
    pub venue: Option<String>,
    pub competition: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

/// Validation error type
#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Query parameter validator
pub struct MatchQueryValidator;

impl MatchQueryValidator {
    /// Validates and normalizes query parameters
    pub fn validate(params: MatchQueryParams) -> Result<ValidatedMatchQuery, ValidationError> {
        let search = Self::normalize_string(params.search).map(|s| s.to_lowercase());
        let venue = Self::normalize_filter(params.venue, ALL_VENUES);
        let competition = Self::normalize_filter(params.competition, ALL_COMPETITIONS);

        let sort_field = match params.sort {
            Some(s) => Self::parse_sort_field(&s)?,
            None => SortField::Date,
        };
        let sort_order = match params.order {
            Some(o) => Self::parse_sort_order(&o)?,
            None => SortOrder::Asc,
        };

        let page = match params.page {
            Some(p) => {
                Self::validate_pagination_param(p, "page")?;
                p
            }
            None => 1,
        };
        let limit = match params.limit {
            Some(l) => {
                Self::validate_pagination_param(l, "limit")?;
                if l > MAX_LIMIT {
                    return Err(ValidationError {
                        message: format!("limit cannot exceed {}", MAX_LIMIT),
                    });
                }
                l
            }
            None => DEFAULT_LIMIT,
        };

        Ok(ValidatedMatchQuery {
            search,
            venue,
            competition,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Trims whitespace; None if the string is empty
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    fn normalize_filter(s: Option<String>, all_sentinel: &str) -> Option<String> {
        Self::normalize_string(s).filter(|v| v != all_sentinel)
    }

    fn parse_sort_field(s: &str) -> Result<SortField, ValidationError> {
        match s.to_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "price" => Ok(SortField::Price),
            "venue" => Ok(SortField::Venue),
            _ => Err(ValidationError {
                message: format!(
                    "Invalid sort field '{}'. Must be 'date', 'price' or 'venue'",
                    s
                ),
            }),
        }
    }

    fn parse_sort_order(s: &str) -> Result<SortOrder, ValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError {
                message: format!("Invalid sort order '{}'. Must be 'asc' or 'desc'", s),
            }),
        }
    }

    fn validate_pagination_param(value: u32, param_name: &str) -> Result<(), ValidationError> {
        if value == 0 {
            return Err(ValidationError {
                message: format!("{} must be a positive number (greater than 0)", param_name),
            });
        }
        Ok(())
    }
}

impl ValidatedMatchQuery {
    pub fn matches(&self, fixture: &Fixture) -> bool {
        if let Some(ref venue) = self.venue {
            if &fixture.stadium != venue {
                return false;
            }
        }
        if let Some(ref competition) = self.competition {
            if &fixture.competition != competition {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            if !fixture.search_haystack().contains(search.as_str()) {
                return false;
            }
        }
        true
    }

    fn compare(&self, a: &Fixture, b: &Fixture) -> Ordering {
        let ordering = match self.sort_field {
            SortField::Date => a.kickoff.cmp(&b.kickoff),
            SortField::Price => a.price_from.cmp(&b.price_from),
            SortField::Venue => a.stadium.cmp(&b.stadium),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filter, sort (stable) and paginate a fixture list
    pub fn apply(&self, fixtures: Vec<Fixture>) -> Vec<Fixture> {
        let mut selected: Vec<Fixture> = fixtures.into_iter().filter(|f| self.matches(f)).collect();
        selected.sort_by(|a, b| self.compare(a, b));

        let offset = ((self.page - 1) as usize).saturating_mul(self.limit as usize);
        selected
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_fixtures;

    fn validated(params: MatchQueryParams) -> ValidatedMatchQuery {
        MatchQueryValidator::validate(params).unwrap()
    }

    fn ids(fixtures: &[Fixture]) -> Vec<&str> {
        fixtures.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_defaults() {
        let query = validated(MatchQueryParams::default());
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort_field, SortField::Date);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_default_listing_is_by_kickoff() {
        let result = validated(MatchQueryParams::default()).apply(sample_fixtures());
        assert_eq!(ids(&result), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = validated(MatchQueryParams {
            search: Some("  ZAMBIA ".to_string()),
            ..Default::default()
        });
        let result = query.apply(sample_fixtures());
        assert_eq!(ids(&result), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_search_matches_city() {
        let query = validated(MatchQueryParams {
            search: Some("kitwe".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&query.apply(sample_fixtures())), vec!["4"]);
    }

    #[test]
    fn test_all_venues_sentinel_means_no_filter() {
        let query = validated(MatchQueryParams {
            venue: Some("All Venues".to_string()),
            competition: Some("All Competitions".to_string()),
            ..Default::default()
        });
        assert!(query.venue.is_none());
        assert!(query.competition.is_none());
        assert_eq!(query.apply(sample_fixtures()).len(), 5);
    }

    #[test]
    fn test_venue_and_competition_filters() {
        let query = validated(MatchQueryParams {
            venue: Some("National Heroes Stadium".to_string()),
            competition: Some("World Cup Qualifiers".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&query.apply(sample_fixtures())), vec!["5"]);
    }

    #[test]
    fn test_sort_by_price() {
        let query = validated(MatchQueryParams {
            sort: Some("price".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&query.apply(sample_fixtures())), vec!["4", "2", "3", "1", "5"]);

        let query = validated(MatchQueryParams {
            sort: Some("PRICE".to_string()),
            order: Some("desc".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&query.apply(sample_fixtures())), vec!["5", "1", "3", "2", "4"]);
    }

    #[test]
    fn test_sort_by_venue_is_stable() {
        let query = validated(MatchQueryParams {
            sort: Some("venue".to_string()),
            ..Default::default()
        });
        // Arthur Davies, Levy Mwanawasa, National Heroes (x2 in kickoff order), Nkoloma
        assert_eq!(ids(&query.apply(sample_fixtures())), vec!["4", "2", "1", "5", "3"]);
    }

    #[test]
    fn test_pagination() {
        let query = validated(MatchQueryParams {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        });
        assert_eq!(ids(&query.apply(sample_fixtures())), vec!["3", "4"]);

        let query = validated(MatchQueryParams {
            page: Some(4),
            limit: Some(2),
            ..Default::default()
        });
        assert!(query.apply(sample_fixtures()).is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(MatchQueryValidator::validate(MatchQueryParams {
            sort: Some("rating".to_string()),
            ..Default::default()
        })
        .is_err());
        assert!(MatchQueryValidator::validate(MatchQueryParams {
            order: Some("sideways".to_string()),
            ..Default::default()
        })
        .is_err());
        assert!(MatchQueryValidator::validate(MatchQueryParams {
            page: Some(0),
            ..Default::default()
        })
        .is_err());
        assert!(MatchQueryValidator::validate(MatchQueryParams {
            limit: Some(101),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(
            MatchQueryValidator::normalize_string(Some("  test  ".to_string())),
            Some("test".to_string())
        );
        assert_eq!(MatchQueryValidator::normalize_string(Some("   ".to_string())), None);
        assert_eq!(MatchQueryValidator::normalize_string(None), None);
    }
}
