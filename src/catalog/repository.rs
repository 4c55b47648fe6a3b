use std::sync::Arc;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{self, Fixture, Team, Venue};
use crate::catalog::stadium::{self, StadiumMap};

/// Read access to fixtures, directories and seating maps
///
/// Handlers only see this trait, so a database-backed catalogue can replace
/// the compiled-in one without touching them.
pub trait CatalogRepository: Send + Sync {
    fn fixtures(&self) -> Vec<Fixture>;

    fn find_fixture(&self, match_id: &str) -> Result<Fixture, CatalogError>;

    /// Seating map for a match
    fn stadium_map(&self, match_id: &str) -> Result<Arc<StadiumMap>, CatalogError>;

    fn competitions(&self) -> Vec<String>;

    fn teams(&self) -> Vec<Team>;

    fn venues(&self) -> Vec<Venue>;
}

/// Catalogue compiled into the binary
///
/// Every match shares the same stadium map; per-match maps need a real
/// venue inventory source.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    fixtures: Vec<Fixture>,
    stadium: Arc<StadiumMap>,
    competitions: Vec<String>,
    teams: Vec<Team>,
    venues: Vec<Venue>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::with_stadium(stadium::levy_mwanawasa())
    }

    /// Same fixtures and directories, different seating map
    pub fn with_stadium(map: StadiumMap) -> Self {
        Self {
            fixtures: models::sample_fixtures(),
            stadium: Arc::new(map),
            competitions: models::competitions(),
            teams: models::teams(),
            venues: models::venues(),
        }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogRepository for StaticCatalog {
    fn fixtures(&self) -> Vec<Fixture> {
        self.fixtures.clone()
    }

    fn find_fixture(&self, match_id: &str) -> Result<Fixture, CatalogError> {
        self.fixtures
            .iter()
            .find(|f| f.id == match_id)
            .cloned()
            .ok_or_else(|| CatalogError::MatchNotFound(match_id.to_string()))
    }

    fn stadium_map(&self, match_id: &str) -> Result<Arc<StadiumMap>, CatalogError> {
        self.find_fixture(match_id)?;
        Ok(Arc::clone(&self.stadium))
    }

    fn competitions(&self) -> Vec<String> {
        self.competitions.clone()
    }

    fn teams(&self) -> Vec<Team> {
        self.teams.clone()
    }

    fn venues(&self) -> Vec<Venue> {
        self.venues.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_fixture() {
        let catalog = StaticCatalog::new();
        let fixture = catalog.find_fixture("2").unwrap();
        assert_eq!(fixture.home_team, "ZESCO United");
    }

    #[test]
    fn test_unknown_fixture() {
        let catalog = StaticCatalog::new();
        assert_eq!(
            catalog.find_fixture("99"),
            Err(CatalogError::MatchNotFound("99".to_string()))
        );
        assert!(catalog.stadium_map("99").is_err());
    }

    #[test]
    fn test_every_match_shares_one_map() {
        let catalog = StaticCatalog::new();
        let first = catalog.stadium_map("1").unwrap();
        let second = catalog.stadium_map("4").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.stadium_name, "Levy Mwanawasa Stadium");
    }
}
