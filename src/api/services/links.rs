//! Link CRUD endpoints (owner-scoped)

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::AuthenticatedUser;
use crate::api::services::types::{ApiResponse, error_response};
use crate::errors::LinkpulseError;
use crate::services::link_service::{self, CreateLink};
use crate::storage::{LinkPatch, SeaOrmStorage};
use migration::entities::link;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Explicit campaign codes; omitted means "generate one"
    #[serde(default)]
    pub custom_codes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkData {
    pub id: i64,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub short_codes: Vec<String>,
    pub short_links: Vec<String>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkData {
    fn new(link: link::Model, short_codes: Vec<String>, click_count: i64) -> Self {
        let base_url = crate::config::get_config()
            .server
            .base_url
            .trim_end_matches('/')
            .to_string();
        let short_links = short_codes
            .iter()
            .map(|code| format!("{}/{}", base_url, code))
            .collect();

        Self {
            id: link.id,
            original_url: link.original_url,
            title: link.title,
            description: link.description,
            is_active: link.is_active,
            short_codes,
            short_links,
            click_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

pub struct LinkApiService {}

impl LinkApiService {
    pub async fn create(
        user: AuthenticatedUser,
        storage: web::Data<SeaOrmStorage>,
        body: web::Json<CreateLinkRequest>,
    ) -> impl Responder {
        let req = body.into_inner();
        let input = CreateLink {
            original_url: req.original_url,
            title: req.title,
            description: req.description,
            custom_codes: req.custom_codes,
        };

        match link_service::create_link(&storage, &user.user_id, input).await {
            Ok(created) => HttpResponse::Created()
                .json(ApiResponse::ok(LinkData::new(created.link, created.codes, 0))),
            Err(e) => error_response(&e),
        }
    }

    pub async fn list(
        user: AuthenticatedUser,
        storage: web::Data<SeaOrmStorage>,
        path: web::Path<String>,
    ) -> impl Responder {
        let user_id = path.into_inner();
        if user_id != user.user_id {
            return error_response(&LinkpulseError::forbidden(
                "Cannot list another user's links",
            ));
        }

        match link_service::list_links(&storage, &user_id).await {
            Ok(overviews) => {
                let data: Vec<LinkData> = overviews
                    .into_iter()
                    .map(|o| LinkData::new(o.link, o.short_codes, o.click_count))
                    .collect();
                HttpResponse::Ok().json(ApiResponse::ok(data))
            }
            Err(e) => error_response(&e),
        }
    }

    pub async fn update(
        user: AuthenticatedUser,
        storage: web::Data<SeaOrmStorage>,
        path: web::Path<i64>,
        body: web::Json<UpdateLinkRequest>,
    ) -> impl Responder {
        let link_id = path.into_inner();
        let req = body.into_inner();
        let patch = LinkPatch {
            title: req.title,
            description: req.description,
            is_active: req.is_active,
            is_deleted: req.is_deleted,
        };

        match link_service::update_link(&storage, &user.user_id, link_id, patch).await {
            Ok(updated) => {
                let codes = match storage.codes_for_link(updated.id).await {
                    Ok(codes) => codes,
                    Err(e) => return error_response(&e),
                };
                HttpResponse::Ok().json(ApiResponse::ok(LinkData::new(updated, codes, 0)))
            }
            Err(e) => error_response(&e),
        }
    }
}
