//! Redirect orchestrator
//!
//! The redirect entry point runs a linear per-request state machine:
//!
//! 1. probe filter (HEAD / prefetch hints) -> 412, nothing recorded
//! 2. short-code lookup among active, non-deleted links -> miss = 404
//! 3. classification (user agent, app source, geo)
//! 4. click recording, best effort
//! 5. destination validation -> malformed = 400 (after recording)
//! 6. 302 to the destination
//!
//! No retries anywhere; degraded classification never blocks the redirect.

use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, error, trace, warn};

use crate::config::{AttributionMode, get_config};
use crate::services::geoip::GeoIpProvider;
use crate::services::{ClassifiedRequest, app_source, classifier, click_recorder};
use crate::storage::SeaOrmStorage;
use crate::utils::ip::extract_client_ip;
use crate::utils::is_valid_short_code;
use crate::utils::url_validator::validate_url;

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        storage: web::Data<SeaOrmStorage>,
        geoip: web::Data<GeoIpProvider>,
    ) -> impl Responder {
        let short_code = path.into_inner();

        // Step 1: probe filter, before any lookup or side effect
        if Self::is_probe_request(&req) {
            trace!("Probe request filtered for code: {}", short_code);
            return Self::probe_filtered_response();
        }

        if !is_valid_short_code(&short_code) {
            trace!("Invalid short code rejected: {}", short_code);
            return Self::not_found_response();
        }

        // Step 2: lookup
        let link = match storage.find_link_by_code(&short_code).await {
            Ok(Some(link)) if link.is_redirectable() => link,
            Ok(_) => {
                debug!("No redirectable link for code: {}", short_code);
                return Self::not_found_response();
            }
            Err(e) => {
                error!("Database error during redirect lookup: {}", e);
                return Self::error_response();
            }
        };

        // Steps 3-4: classify and record, never blocking the redirect
        let classified = Self::classify_request(&req, &short_code, &geoip).await;
        let outcome = click_recorder::record_click(&storage, link.id, &classified).await;
        if let click_recorder::RecordOutcome::Skipped(reason) = &outcome {
            warn!(link_id = link.id, reason, "Click skipped");
        }

        // Step 5: fail closed on a malformed stored destination
        if let Err(e) = validate_url(&link.original_url) {
            warn!(link_id = link.id, "Stored destination rejected: {}", e);
            return Self::bad_destination_response();
        }

        // Step 6
        debug!(link_id = link.id, "Redirecting {} -> {}", short_code, link.original_url);
        HttpResponse::Found()
            .insert_header(("Location", link.original_url))
            .finish()
    }

    /// HEAD requests and `sec-purpose`/`purpose` prefetch or prerender hints
    /// are probes, not navigations; they must not consume a click.
    fn is_probe_request(req: &HttpRequest) -> bool {
        if req.method() == Method::HEAD {
            return true;
        }

        ["sec-purpose", "purpose"].iter().any(|name| {
            req.headers()
                .get(*name)
                .and_then(|h| h.to_str().ok())
                .is_some_and(|v| {
                    let v = v.to_lowercase();
                    v.contains("prefetch") || v.contains("prerender")
                })
        })
    }

    async fn classify_request(
        req: &HttpRequest,
        short_code: &str,
        geoip: &GeoIpProvider,
    ) -> ClassifiedRequest {
        let user_agent = req
            .headers()
            .get("User-Agent")
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        let ua_str = user_agent.as_deref().unwrap_or("");

        let client = classifier::classify(ua_str);
        let source = match get_config().analytics.attribution_mode {
            AttributionMode::UserAgent => app_source::detect(ua_str),
            AttributionMode::ShortCode => app_source::detect_from_code(short_code),
        };

        let ip = extract_client_ip(req);
        let geo = match &ip {
            Some(ip) => geoip.resolve(ip).await,
            None => None,
        };

        ClassifiedRequest {
            client,
            source,
            user_agent,
            ip,
            geo,
        }
    }

    #[inline]
    fn probe_filtered_response() -> HttpResponse {
        HttpResponse::build(StatusCode::PRECONDITION_FAILED)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Precondition Failed")
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body("Not Found")
    }

    #[inline]
    fn bad_destination_response() -> HttpResponse {
        HttpResponse::build(StatusCode::BAD_REQUEST)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Invalid destination URL")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("Internal Server Error")
    }
}
