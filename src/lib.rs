// FAZ Ticket storefront service
// Stadium map, seat selection, pricing, cart and checkout behind an axum API

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notice;
pub mod orders;
pub mod query;
pub mod selection;
pub mod session;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use catalog::{CatalogRepository, StaticCatalog};
use config::Config;
use error::ApiError;
use gateway::{cors_layer, origin_guard, AllowedOrigins};
use orders::{PaymentGateway, SimulatedGateway};
use session::SessionStore;

/// Largest accepted request body
pub const BODY_LIMIT_BYTES: usize = 200 * 1024;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        gateway::health::health,
        catalog::handlers::list_matches,
        catalog::handlers::match_filters,
        catalog::handlers::get_match,
        catalog::handlers::get_stadium,
        catalog::handlers::get_block,
        catalog::handlers::list_teams,
        catalog::handlers::list_venues,
        orders::handlers::quote,
        session::create_session,
        session::delete_session,
        selection::handlers::enter_match,
        selection::handlers::get_selection,
        selection::handlers::select_block,
        selection::handlers::select_row,
        selection::handlers::toggle_seat,
        selection::handlers::add_to_cart,
        cart::handlers::get_cart,
        cart::handlers::update_line_quantity,
        cart::handlers::remove_line,
        orders::handlers::submit_checkout,
        orders::handlers::get_checkout,
        orders::handlers::cancel_checkout,
        orders::handlers::list_orders,
    ),
    components(
        schemas(
            catalog::FixtureStatus,
            catalog::FixtureResponse,
            catalog::FixtureFilters,
            catalog::Team,
            catalog::Venue,
            catalog::BlockSummary,
            catalog::StandGroup,
            catalog::StadiumMapResponse,
            catalog::Block,
            catalog::Row,
            catalog::Seat,
            catalog::SeatStatus,
            catalog::Stand,
            catalog::BlockCategory,
            notice::Notice,
            orders::PricedItem,
            orders::OrderSummary,
            orders::QuoteRequest,
            orders::CheckoutStatus,
            orders::MobileProvider,
            orders::PaymentMethod,
            orders::CheckoutRequest,
            orders::Order,
            orders::Confirmation,
            orders::CheckoutView,
            orders::TicketEntry,
            orders::TicketHistory,
            session::SessionCreated,
            selection::SelectionState,
            selection::SelectionView,
            selection::EnterMatchRequest,
            selection::SelectBlockRequest,
            selection::SelectRowRequest,
            selection::SelectionResponse,
            selection::AddToCartResponse,
            cart::CartLine,
            cart::CartLineView,
            cart::CartView,
            cart::HoldStatus,
            cart::UpdateQuantityRequest,
        )
    ),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "catalog", description = "Fixtures, directories and stadium maps"),
        (name = "pricing", description = "Order pricing"),
        (name = "sessions", description = "Browsing sessions"),
        (name = "selection", description = "Seat selection on a match page"),
        (name = "cart", description = "Cart lines and hold countdown"),
        (name = "checkout", description = "Payment and confirmation"),
        (name = "orders", description = "Purchased tickets")
    ),
    info(
        title = "FAZ Ticket API",
        version = "1.0.0",
        description = "Storefront API for football match tickets"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub sessions: SessionStore,
    pub payments: Arc<dyn PaymentGateway>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State with the compiled-in catalogue and the simulated gateway
    pub fn new(config: Config) -> Self {
        let payments = Arc::new(SimulatedGateway::new(config.payment_delay));
        Self::with_gateway(config, payments)
    }

    pub fn with_gateway(config: Config, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            catalog: Arc::new(StaticCatalog::new()),
            sessions: SessionStore::new(),
            payments,
            config: Arc::new(config),
        }
    }
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found("Route", uri.path())
}

/// Creates and configures the application router
///
/// Layer order, outermost first: panic recovery, tracing, security headers,
/// origin guard, CORS, body limit. Only the API prefixes are rate limited.
pub fn create_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let origins = AllowedOrigins::new(config.allowed_origins.clone());

    let api = Router::new()
        // Public catalogue
        .route("/api/public/matches", get(catalog::list_matches))
        .route("/api/public/matches/filters", get(catalog::match_filters))
        .route("/api/public/matches/:match_id", get(catalog::get_match))
        .route("/api/public/matches/:match_id/stadium", get(catalog::get_stadium))
        .route(
            "/api/public/matches/:match_id/stadium/blocks/:block_id",
            get(catalog::get_block),
        )
        .route("/api/public/teams", get(catalog::list_teams))
        .route("/api/public/venues", get(catalog::list_venues))
        .route("/api/public/pricing/quote", post(orders::quote))
        // Frontend sessions
        .route("/api/frontend/sessions", post(session::create_session))
        .route(
            "/api/frontend/sessions/:session_id",
            axum::routing::delete(session::delete_session),
        )
        .route(
            "/api/frontend/sessions/:session_id/selection",
            post(selection::enter_match).get(selection::get_selection),
        )
        .route(
            "/api/frontend/sessions/:session_id/selection/block",
            put(selection::select_block),
        )
        .route(
            "/api/frontend/sessions/:session_id/selection/row",
            put(selection::select_row),
        )
        .route(
            "/api/frontend/sessions/:session_id/selection/seats/:seat_number",
            post(selection::toggle_seat),
        )
        .route(
            "/api/frontend/sessions/:session_id/selection/add-to-cart",
            post(selection::add_to_cart),
        )
        .route("/api/frontend/sessions/:session_id/cart", get(cart::get_cart))
        .route(
            "/api/frontend/sessions/:session_id/cart/lines/:line_id",
            axum::routing::patch(cart::update_line_quantity).delete(cart::remove_line),
        )
        .route(
            "/api/frontend/sessions/:session_id/checkout",
            post(orders::submit_checkout)
                .get(orders::get_checkout)
                .delete(orders::cancel_checkout),
        )
        .route("/api/frontend/sessions/:session_id/orders", get(orders::list_orders));
    let api = gateway::apply_rate_limit(api, config.rate_limit);

    let router = Router::new()
        .route("/health", get(gateway::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(&origins))
        .layer(middleware::from_fn_with_state(origins, origin_guard));

    gateway::apply_security_headers(router, config.is_production())
        .layer(TraceLayer::new_for_http())
        .layer(gateway::panic_layer())
        .with_state(state)
}
