use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::db::MySqlProvider;
use crate::middleware::{make_span_with_request_id, request_id_middleware, scoped_connection};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let mut leased: Router<AppState> = Router::new()
        .route("/cars", get(handlers::list_cars).post(handlers::create_car))
        .route(
            "/cars/:id",
            put(handlers::update_car_year).delete(handlers::delete_car),
        );

    if state.enable_admin_routes {
        tracing::warn!("Admin route PUT /addcolumn is enabled");
        leased = leased.route("/addcolumn", put(handlers::add_date_created_column));
    }

    // Only matched routes lease a connection; 404s and /health never do
    let leased = leased.route_layer(middleware::from_fn_with_state(
        state.scope.clone(),
        scoped_connection::<MySqlProvider>,
    ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(leased)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
