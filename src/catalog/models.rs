use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::stadium::{Block, BlockCategory, Stand, StadiumMap};

/// Ticket availability badge shown on a fixture card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FixtureStatus {
    Available,
    Limited,
    SoldOut,
}

/// A scheduled match tickets can be bought for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Fixture {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "Zambia")]
    pub home_team: String,
    #[schema(example = "Ghana")]
    pub away_team: String,
    #[schema(example = "AFCON Qualifiers")]
    pub competition: String,
    #[schema(value_type = String, example = "2024-12-15T16:00:00")]
    pub kickoff: NaiveDateTime,
    #[schema(example = "National Heroes Stadium")]
    pub stadium: String,
    #[schema(example = "Lusaka")]
    pub city: String,
    /// Cheapest ticket price in ZMW
    #[schema(value_type = String, example = "120")]
    pub price_from: Decimal,
    pub status: FixtureStatus,
}

impl Fixture {
    /// Text the free-form search matches against
    pub fn search_haystack(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.home_team, self.away_team, self.city, self.stadium, self.competition
        )
        .to_lowercase()
    }
}

/// Fixture as returned to the storefront, with display labels
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FixtureResponse {
    #[serde(flatten)]
    pub fixture: Fixture,
    #[schema(example = "Sun, 15 Dec 2024")]
    pub date_label: String,
    #[schema(example = "16:00")]
    pub time_label: String,
}

impl From<Fixture> for FixtureResponse {
    fn from(fixture: Fixture) -> Self {
        Self {
            date_label: fixture.kickoff.format("%a, %d %b %Y").to_string(),
            time_label: fixture.kickoff.format("%H:%M").to_string(),
            fixture,
        }
    }
}

/// Distinct filter values for the listing page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FixtureFilters {
    pub venues: Vec<String>,
    pub competitions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    pub id: u32,
    #[schema(example = "Zesco United FC")]
    pub name: String,
    pub stadium: String,
    pub city: String,
    pub capacity: u32,
    pub founded: u16,
    pub colors: String,
    pub achievements: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Venue {
    pub id: u32,
    #[schema(example = "Levy Mwanawasa Stadium")]
    pub name: String,
    pub city: String,
    pub capacity: u32,
    pub opened: u16,
    pub surface: String,
    pub features: Vec<String>,
    pub description: String,
}

/// Block overview without the seat grid
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockSummary {
    pub id: String,
    pub name: String,
    pub stand: Stand,
    pub category: BlockCategory,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub rows: usize,
    pub available_seats: usize,
    pub low_stock: bool,
    /// Blocks without available seats cannot be selected
    pub selectable: bool,
}

impl From<&Block> for BlockSummary {
    fn from(block: &Block) -> Self {
        let available_seats = block.available_count();
        Self {
            id: block.id.clone(),
            name: block.name.clone(),
            stand: block.stand,
            category: block.category,
            price: block.price,
            rows: block.rows.len(),
            available_seats,
            low_stock: block.is_low_stock(),
            selectable: available_seats > 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StandGroup {
    pub stand: Stand,
    pub blocks: Vec<BlockSummary>,
}

/// Stadium map overview for one match
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StadiumMapResponse {
    pub match_id: String,
    pub stadium_name: String,
    pub city: String,
    pub stands: Vec<StandGroup>,
}

impl StadiumMapResponse {
    pub fn new(match_id: &str, map: &StadiumMap) -> Self {
        Self {
            match_id: match_id.to_string(),
            stadium_name: map.stadium_name.clone(),
            city: map.city.clone(),
            stands: map
                .by_stand()
                .into_iter()
                .map(|(stand, blocks)| StandGroup {
                    stand,
                    blocks: blocks.into_iter().map(BlockSummary::from).collect(),
                })
                .collect(),
        }
    }
}

pub(crate) fn kickoff(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

/// Fixture list shown on the matches page
pub fn sample_fixtures() -> Vec<Fixture> {
    let fixture = |id: &str,
                   home: &str,
                   away: &str,
                   competition: &str,
                   kickoff: NaiveDateTime,
                   stadium: &str,
                   city: &str,
                   price_from: i64,
                   status: FixtureStatus| Fixture {
        id: id.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        competition: competition.to_string(),
        kickoff,
        stadium: stadium.to_string(),
        city: city.to_string(),
        price_from: Decimal::from(price_from),
        status,
    };

    vec![
        fixture("1", "Zambia", "Ghana", "AFCON Qualifiers", kickoff(2024, 12, 15, 16, 0),
            "National Heroes Stadium", "Lusaka", 120, FixtureStatus::Available),
        fixture("2", "ZESCO United", "Zanaco", "FAZ Super League", kickoff(2024, 12, 21, 15, 0),
            "Levy Mwanawasa Stadium", "Ndola", 80, FixtureStatus::Limited),
        fixture("3", "Zambia", "Tanzania", "Friendly Matches", kickoff(2025, 1, 4, 15, 0),
            "Nkoloma Stadium", "Lusaka", 90, FixtureStatus::Available),
        fixture("4", "Nkana FC", "Power Dynamos", "FAZ Super League", kickoff(2025, 1, 8, 18, 0),
            "Arthur Davies Stadium", "Kitwe", 70, FixtureStatus::Available),
        fixture("5", "Zambia", "Malawi", "World Cup Qualifiers", kickoff(2025, 1, 25, 15, 0),
            "National Heroes Stadium", "Lusaka", 150, FixtureStatus::SoldOut),
    ]
}

pub fn competitions() -> Vec<String> {
    ["AFCON Qualifiers", "World Cup Qualifiers", "FAZ Super League", "Friendly Matches"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

pub fn teams() -> Vec<Team> {
    let team = |id, name: &str, stadium: &str, city: &str, capacity, founded, colors: &str, achievements: &str| Team {
        id,
        name: name.to_string(),
        stadium: stadium.to_string(),
        city: city.to_string(),
        capacity,
        founded,
        colors: colors.to_string(),
        achievements: achievements.to_string(),
    };

    vec![
        team(1, "Chipolopolo (National Team)", "Heroes National Stadium", "Lusaka", 60_000, 1929, "Green & White", "1x African Cup Winner (2012)"),
        team(2, "Zesco United FC", "Levy Mwanawasa Stadium", "Ndola", 49_800, 1974, "Blue & White", "8x Super League Champions"),
        team(3, "Nkana FC", "Nkana Stadium", "Kitwe", 10_000, 1935, "Red & Black", "13x League Champions"),
        team(4, "Red Arrows FC", "Nkoloma Stadium", "Lusaka", 5_000, 1965, "Red & Green", "5x League Champions"),
        team(5, "Green Eagles FC", "Nkoloma Stadium", "Choma", 5_000, 1986, "Green & Yellow", "1x League Champions"),
        team(6, "Power Dynamos FC", "Arthur Davies Stadium", "Kitwe", 18_000, 1971, "Orange & Black", "6x League Champions"),
    ]
}

pub fn venues() -> Vec<Venue> {
    let venue = |id, name: &str, city: &str, capacity, opened, features: &[&str], description: &str| Venue {
        id,
        name: name.to_string(),
        city: city.to_string(),
        capacity,
        opened,
        surface: "Natural Grass".to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        description: description.to_string(),
    };

    vec![
        venue(1, "Heroes National Stadium", "Lusaka", 60_000, 2014,
            &["VIP Lounges", "Media Center", "Training Facilities", "Modern Lighting"],
            "Zambia's premier sports venue, hosting national team matches and major events."),
        venue(2, "Levy Mwanawasa Stadium", "Ndola", 49_800, 2012,
            &["Olympic Standard Track", "VIP Boxes", "Conference Rooms"],
            "One of Africa's most modern stadiums, home to Zesco United FC."),
        venue(3, "Nkana Stadium", "Kitwe", 10_000, 1955,
            &["Historic Venue", "Local Atmosphere", "Community Hub"],
            "Historic home of Nkana FC, one of Zambia's oldest football clubs."),
        venue(4, "Nkoloma Stadium", "Lusaka", 5_000, 2008,
            &["Compact Design", "Great Acoustics", "Easy Access"],
            "Multi-purpose venue hosting various league matches."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_status_serialization() {
        let json = serde_json::to_string(&FixtureStatus::SoldOut).unwrap();
        assert_eq!(json, "\"sold-out\"");
    }

    #[test]
    fn test_fixture_response_labels() {
        let fixture = sample_fixtures().into_iter().next().unwrap();
        let response = FixtureResponse::from(fixture);
        assert_eq!(response.date_label, "Sun, 15 Dec 2024");
        assert_eq!(response.time_label, "16:00");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["home_team"], "Zambia");
        assert_eq!(json["status"], "available");
    }

    #[test]
    fn test_fixture_ids_are_unique() {
        let fixtures = sample_fixtures();
        let mut ids: Vec<&str> = fixtures.iter().map(|f| f.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), fixtures.len());
    }

    #[test]
    fn test_haystack_is_lowercase() {
        let fixture = sample_fixtures().remove(1);
        let haystack = fixture.search_haystack();
        assert!(haystack.contains("zesco united"));
        assert!(haystack.contains("ndola"));
    }
}
