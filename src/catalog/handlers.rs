// HTTP handlers for the public catalogue endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::debug;

use crate::catalog::{
    Block, FixtureFilters, FixtureResponse, StadiumMapResponse, Team, Venue,
};
use crate::error::ApiError;
use crate::query::{MatchQueryParams, MatchQueryValidator};
use crate::validation::validate_block_id;
use crate::AppState;

/// Handler for GET /api/public/matches
/// Lists fixtures with search, filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/public/matches",
    params(MatchQueryParams),
    responses(
        (status = 200, description = "Matching fixtures", body = Vec<FixtureResponse>),
        (status = 400, description = "Invalid query parameter")
    ),
    tag = "catalog"
)]
pub async fn list_matches(
    State(state): State<AppState>,
    Query(params): Query<MatchQueryParams>,
) -> Result<Json<Vec<FixtureResponse>>, ApiError> {
    debug!("Listing matches with query parameters: {:?}", params);

    let validated =
        MatchQueryValidator::validate(params).map_err(|e| ApiError::BadRequest(e.message))?;
    let fixtures = validated.apply(state.catalog.fixtures());

    debug!("Query returned {} fixtures", fixtures.len());
    Ok(Json(fixtures.into_iter().map(FixtureResponse::from).collect()))
}

/// Handler for GET /api/public/matches/filters
/// Returns the venue and competition options for the listing page
#[utoipa::path(
    get,
    path = "/api/public/matches/filters",
    responses(
        (status = 200, description = "Filter options", body = FixtureFilters)
    ),
    tag = "catalog"
)]
pub async fn match_filters(State(state): State<AppState>) -> Json<FixtureFilters> {
    let mut venues: Vec<String> = Vec::new();
    for fixture in state.catalog.fixtures() {
        if !venues.contains(&fixture.stadium) {
            venues.push(fixture.stadium);
        }
    }

    Json(FixtureFilters {
        venues,
        competitions: state.catalog.competitions(),
    })
}

#[utoipa::path(
    get,
    path = "/api/public/matches/{match_id}",
    params(
        ("match_id" = String, Path, description = "Match ID")
    ),
    responses(
        (status = 200, description = "Match found", body = FixtureResponse),
        (status = 404, description = "Match not found")
    ),
    tag = "catalog"
)]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<FixtureResponse>, ApiError> {
    debug!("Fetching match with id: {}", match_id);
    let fixture = state.catalog.find_fixture(&match_id)?;
    Ok(Json(fixture.into()))
}

/// Handler for GET /api/public/matches/{match_id}/stadium
/// Block overview grouped by stand, with availability counts
#[utoipa::path(
    get,
    path = "/api/public/matches/{match_id}/stadium",
    params(
        ("match_id" = String, Path, description = "Match ID")
    ),
    responses(
        (status = 200, description = "Stadium map", body = StadiumMapResponse),
        (status = 404, description = "Match not found")
    ),
    tag = "catalog"
)]
pub async fn get_stadium(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<StadiumMapResponse>, ApiError> {
    let map = state.catalog.stadium_map(&match_id)?;
    Ok(Json(StadiumMapResponse::new(&match_id, &map)))
}

/// Handler for GET /api/public/matches/{match_id}/stadium/blocks/{block_id}
/// Full row and seat grid of one block
#[utoipa::path(
    get,
    path = "/api/public/matches/{match_id}/stadium/blocks/{block_id}",
    params(
        ("match_id" = String, Path, description = "Match ID"),
        ("block_id" = String, Path, description = "Block ID, e.g. A1")
    ),
    responses(
        (status = 200, description = "Block with rows and seats", body = Block),
        (status = 400, description = "Malformed block id"),
        (status = 404, description = "Match or block not found")
    ),
    tag = "catalog"
)]
pub async fn get_block(
    State(state): State<AppState>,
    Path((match_id, block_id)): Path<(String, String)>,
) -> Result<Json<Block>, ApiError> {
    validate_block_id(&block_id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid block id '{}'", block_id)))?;

    let map = state.catalog.stadium_map(&match_id)?;
    let block = map
        .block(&block_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Block", &block_id))?;

    debug!(
        "Block {} for match {} has {} available seats",
        block.id,
        match_id,
        block.available_count()
    );
    Ok(Json(block))
}

#[utoipa::path(
    get,
    path = "/api/public/teams",
    responses(
        (status = 200, description = "Team directory", body = Vec<Team>)
    ),
    tag = "catalog"
)]
pub async fn list_teams(State(state): State<AppState>) -> Json<Vec<Team>> {
    Json(state.catalog.teams())
}

#[utoipa::path(
    get,
    path = "/api/public/venues",
    responses(
        (status = 200, description = "Venue directory", body = Vec<Venue>)
    ),
    tag = "catalog"
)]
pub async fn list_venues(State(state): State<AppState>) -> Json<Vec<Venue>> {
    Json(state.catalog.venues())
}
