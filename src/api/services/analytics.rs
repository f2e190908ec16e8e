//! Analytics endpoints (owner-scoped read path)

use actix_web::{HttpResponse, Responder, web};

use crate::api::middleware::AuthenticatedUser;
use crate::api::services::types::{ApiResponse, error_response};
use crate::errors::LinkpulseError;
use crate::services::analytics_service;
use crate::storage::SeaOrmStorage;

pub struct AnalyticsApiService {}

impl AnalyticsApiService {
    pub async fn overview(
        user: AuthenticatedUser,
        storage: web::Data<SeaOrmStorage>,
        path: web::Path<String>,
    ) -> impl Responder {
        let user_id = path.into_inner();
        if user_id != user.user_id {
            return error_response(&LinkpulseError::forbidden(
                "Cannot view another user's analytics",
            ));
        }

        match analytics_service::overview(&storage, &user_id).await {
            Ok(overview) => HttpResponse::Ok().json(ApiResponse::ok(overview)),
            Err(e) => error_response(&e),
        }
    }

    pub async fn heatmap(
        user: AuthenticatedUser,
        storage: web::Data<SeaOrmStorage>,
        path: web::Path<String>,
    ) -> impl Responder {
        let user_id = path.into_inner();
        if user_id != user.user_id {
            return error_response(&LinkpulseError::forbidden(
                "Cannot view another user's analytics",
            ));
        }

        match analytics_service::heatmap(&storage, &user_id).await {
            Ok(heatmap) => HttpResponse::Ok().json(ApiResponse::ok(heatmap)),
            Err(e) => error_response(&e),
        }
    }
}
