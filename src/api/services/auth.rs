//! Registration, login and token refresh. Thin plumbing around argon2
//! hashing and the JWT service.

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::jwt::get_jwt_service;
use crate::api::services::types::{ApiResponse, error_response};
use crate::errors::{LinkpulseError, Result};
use crate::storage::SeaOrmStorage;
use crate::utils::password::{hash_password, verify_password};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

pub struct AuthService {}

impl AuthService {
    pub async fn register(
        storage: web::Data<SeaOrmStorage>,
        body: web::Json<RegisterRequest>,
    ) -> impl Responder {
        match Self::do_register(&storage, body.into_inner()).await {
            Ok(tokens) => HttpResponse::Created().json(ApiResponse::ok(tokens)),
            Err(e) => error_response(&e),
        }
    }

    async fn do_register(storage: &SeaOrmStorage, req: RegisterRequest) -> Result<TokenPair> {
        let email = req.email.trim().to_lowercase();
        if !email.contains('@') || email.len() < 3 {
            return Err(LinkpulseError::validation("Invalid email address"));
        }
        if req.password.len() < 8 {
            return Err(LinkpulseError::validation(
                "Password must be at least 8 characters",
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let user = storage.create_user(&email, &password_hash).await?;

        info!(user_id = %user.id, "User registered");
        Self::issue_tokens(user.id, user.email)
    }

    pub async fn login(
        storage: web::Data<SeaOrmStorage>,
        body: web::Json<LoginRequest>,
    ) -> impl Responder {
        match Self::do_login(&storage, body.into_inner()).await {
            Ok(tokens) => HttpResponse::Ok().json(ApiResponse::ok(tokens)),
            Err(e) => error_response(&e),
        }
    }

    async fn do_login(storage: &SeaOrmStorage, req: LoginRequest) -> Result<TokenPair> {
        let email = req.email.trim().to_lowercase();

        let Some(user) = storage.find_user_by_email(&email).await? else {
            return Err(LinkpulseError::unauthorized("Invalid email or password"));
        };

        if !verify_password(&req.password, &user.password_hash)? {
            return Err(LinkpulseError::unauthorized("Invalid email or password"));
        }

        info!(user_id = %user.id, "User logged in");
        Self::issue_tokens(user.id, user.email)
    }

    pub async fn refresh(body: web::Json<RefreshRequest>) -> impl Responder {
        let jwt = get_jwt_service();

        match jwt
            .validate_refresh_token(&body.refresh_token)
            .and_then(|claims| jwt.generate_access_token(&claims.sub))
        {
            Ok(access_token) => {
                HttpResponse::Ok().json(ApiResponse::ok(AccessToken { access_token }))
            }
            Err(e) => error_response(&LinkpulseError::from(e)),
        }
    }

    fn issue_tokens(user_id: String, email: String) -> Result<TokenPair> {
        let jwt = get_jwt_service();
        let access_token = jwt.generate_access_token(&user_id)?;
        let refresh_token = jwt.generate_refresh_token(&user_id)?;

        Ok(TokenPair {
            user_id,
            email,
            access_token,
            refresh_token,
        })
    }
}
