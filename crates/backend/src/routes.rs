use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::system::auth::middleware::{require_admin, require_auth};
use crate::{handlers, system};

/// Every route of the service with its auth layer
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // AUTH (PUBLIC)
        // ========================================
        .route("/login", post(system::handlers::auth::login))
        .route(
            "/api/me",
            get(system::handlers::auth::current_user).layer(middleware::from_fn(require_auth)),
        )
        // ========================================
        // SALES
        // ========================================
        .route(
            "/api/sales",
            get(handlers::sales::list_own).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/sales/summary",
            get(handlers::sales::summary_own).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/sales/:salesperson_id",
            get(handlers::sales::list_for_salesperson).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/salesperson/:salesperson_id/info",
            get(handlers::sales::salesperson_info).layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // BUDGET
        // ========================================
        .route(
            "/api/budget",
            get(handlers::budget::list_own)
                .post(handlers::budget::create_own)
                .layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/budget/autosuggest",
            get(handlers::budget::autosuggest).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/budget/generate-from-sales",
            post(handlers::budget::generate_own).layer(middleware::from_fn(require_auth)),
        )
        // GET/POST address a salesperson (admin), PUT/DELETE a budget (owner or admin)
        .route(
            "/api/budget/:id",
            get(handlers::budget::list_for_salesperson)
                .post(handlers::budget::create_for_salesperson)
                .layer(middleware::from_fn(require_admin))
                .merge(
                    put(handlers::budget::update)
                        .delete(handlers::budget::delete)
                        .layer(middleware::from_fn(require_auth)),
                ),
        )
        .route(
            "/api/budget/:id/:budget_id",
            put(handlers::budget::update_for_salesperson)
                .delete(handlers::budget::delete_for_salesperson)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/budget/:id/generate-from-sales",
            post(handlers::budget::generate_for_salesperson)
                .layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // ADMIN
        // ========================================
        .route(
            "/api/admin/summary",
            get(handlers::admin::summary).layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // DIVISION ALLOCATION
        // ========================================
        .route(
            "/api/division/allocations",
            get(handlers::division::allocations).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/division/allocations/:salesperson_id/:customer_class/:group_key",
            get(handlers::division::group_allocations).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/division/save-ratios",
            post(handlers::division::save_ratios).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/division/reset-group/:salesperson_id/:customer_class/:group_key",
            delete(handlers::division::reset_group).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/division/reset-all",
            delete(handlers::division::reset_all).layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // GROSS PROFIT
        // ========================================
        .route(
            "/api/gross-profit",
            get(handlers::gross_profit::list).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/gross-profit/overrides",
            post(handlers::gross_profit::save_overrides).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/gross-profit/reset-group/:salesperson_id/:customer_class/:group_key",
            delete(handlers::gross_profit::reset_group).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/gross-profit/:salesperson_id/:customer_class/:group_key",
            get(handlers::gross_profit::group).layer(middleware::from_fn(require_admin)),
        )
}

/// Full application: routes plus request logging and CORS
pub fn app() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ]);

    configure_routes()
        .layer(middleware::from_fn(system::middleware::request_logger))
        .layer(cors)
}
