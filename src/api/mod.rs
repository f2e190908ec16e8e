//! HTTP surface: route wiring, JWT, auth middleware and handlers.

pub mod jwt;
pub mod middleware;
pub mod services;

use actix_web::web;

use middleware::RequireAuth;
use services::analytics::AnalyticsApiService;
use services::auth::AuthService;
use services::links::LinkApiService;
use services::redirect::RedirectService;

/// Authenticated API routes plus the public auth endpoints.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(AuthService::register))
            .route("/login", web::post().to(AuthService::login))
            .route("/refresh", web::post().to(AuthService::refresh)),
    )
    .service(
        web::scope("/links")
            .wrap(RequireAuth)
            .route("", web::post().to(LinkApiService::create))
            .route("/{user_id}", web::get().to(LinkApiService::list))
            .route("/{id}", web::put().to(LinkApiService::update)),
    )
    .service(
        web::scope("/analytics")
            .wrap(RequireAuth)
            .route(
                "/overview/{user_id}",
                web::get().to(AnalyticsApiService::overview),
            )
            .route(
                "/heatmap/{user_id}",
                web::get().to(AnalyticsApiService::heatmap),
            ),
    );
}

/// The public redirect entry point. Registered last so it only catches
/// paths no other route claimed. HEAD is routed too; the handler answers
/// probes with 412.
pub fn configure_redirect(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/{short_code}",
        web::get().to(RedirectService::handle_redirect),
    )
    .route(
        "/{short_code}",
        web::head().to(RedirectService::handle_redirect),
    );
}
