//! Geo resolver
//!
//! Maps a client IP to `{country, region, city}` using an offline MaxMind
//! database behind the [`GeoIpLookup`] trait. Lookups never fail the caller:
//! any problem (malformed IP, missing database, DB miss) yields `None`.
//!
//! Before lookup the IP is normalized: the IPv4-mapped `::ffff:` prefix is
//! stripped, and loopback addresses are substituted with a configured public
//! fallback so local traffic still resolves to some location.

mod maxmind;

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::AnalyticsConfig;
use crate::utils::ip::is_private_or_local;
pub use maxmind::MaxMindProvider;

/// Resolved geographic location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 country code (e.g. "VN", "US")
    pub country: Option<String>,
    /// First-level subdivision name
    pub region: Option<String>,
    /// City name, after display translation
    pub city: Option<String>,
}

#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo>;

    /// Provider name, for logs
    fn name(&self) -> &'static str;
}

/// Disabled lookup, used when no database is configured.
struct NullProvider;

#[async_trait]
impl GeoIpLookup for NullProvider {
    async fn lookup(&self, _ip: IpAddr) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}

/// Unified geo resolver: normalization + provider lookup + city translation.
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
    fallback_ip: String,
    city_translations: std::collections::HashMap<String, String>,
}

impl GeoIpProvider {
    /// Initialize from configuration. A missing or unreadable MaxMind
    /// database disables lookups rather than failing startup.
    pub fn new(config: &AnalyticsConfig) -> Self {
        let inner: Arc<dyn GeoIpLookup> = if let Some(ref path) = config.maxminddb_path {
            match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: failed to load MaxMind database at {}: {}, geo lookups disabled",
                        path, e
                    );
                    Arc::new(NullProvider)
                }
            }
        } else {
            debug!("GeoIP: no MaxMind database configured, geo lookups disabled");
            Arc::new(NullProvider)
        };

        Self {
            inner,
            fallback_ip: config.geo_fallback_ip.clone(),
            city_translations: config.city_translations.clone(),
        }
    }

    /// Wrap an explicit lookup implementation (used by tests).
    pub fn with_lookup(inner: Arc<dyn GeoIpLookup>, config: &AnalyticsConfig) -> Self {
        Self {
            inner,
            fallback_ip: config.geo_fallback_ip.clone(),
            city_translations: config.city_translations.clone(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }

    /// Resolve an IP address string to a location.
    pub async fn resolve(&self, ip: &str) -> Option<GeoInfo> {
        let normalized = self.normalize_ip(ip)?;
        let mut geo = self.inner.lookup(normalized).await?;
        geo.city = geo
            .city
            .filter(|c| !c.is_empty())
            .map(|c| self.translate_city(c));
        Some(geo)
    }

    /// Strip the `::ffff:` IPv4-mapped prefix and substitute loopback with
    /// the configured fallback address. Malformed input yields `None`, as
    /// do private and link-local addresses, which a public geo database
    /// can never resolve.
    fn normalize_ip(&self, ip: &str) -> Option<IpAddr> {
        let trimmed = ip.trim();
        let stripped = trimmed
            .strip_prefix("::ffff:")
            .filter(|rest| rest.parse::<std::net::Ipv4Addr>().is_ok())
            .unwrap_or(trimmed);

        let mut addr: IpAddr = stripped.parse().ok()?;

        // Also unmap addresses that parsed as mapped IPv6
        if let IpAddr::V6(v6) = addr {
            if let Some(v4) = v6.to_ipv4_mapped() {
                addr = IpAddr::V4(v4);
            }
        }

        if addr.is_loopback() {
            return self.fallback_ip.parse().ok();
        }

        if is_private_or_local(&addr) {
            return None;
        }

        Some(addr)
    }

    fn translate_city(&self, city: String) -> String {
        self.city_translations.get(&city).cloned().unwrap_or(city)
    }
}

impl Clone for GeoIpProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            fallback_ip: self.fallback_ip.clone(),
            city_translations: self.city_translations.clone(),
        }
    }
}
