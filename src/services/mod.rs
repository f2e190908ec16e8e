//! Core services: classification, attribution, geo resolution, click
//! recording, link management and analytics aggregation.

pub mod analytics_service;
pub mod app_source;
pub mod classifier;
pub mod click_recorder;
pub mod geoip;
pub mod link_service;

use classifier::ClassifiedClient;
use geoip::GeoInfo;

/// Everything learned about one redirect request. Ephemeral: built by the
/// redirect handler, consumed by the click recorder, never persisted as-is.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedRequest {
    pub client: ClassifiedClient,
    /// Attributed channel label from the app-source detector
    pub source: String,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub geo: Option<GeoInfo>,
}
