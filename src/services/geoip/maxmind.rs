//! MaxMind GeoLite2-City lookup

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::{GeoInfo, GeoIpLookup};

pub struct MaxMindProvider {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindProvider {
    pub fn new(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo> {
        let result = self.reader.lookup(ip).ok()?;
        let city: maxminddb::geoip2::City = result.decode().ok()??;

        let country = city.country.iso_code.map(String::from);
        let region = city
            .subdivisions
            .first()
            .and_then(|sub| sub.names.english.map(String::from));
        let city_name = city.city.names.english.map(String::from);

        trace!(
            "MaxMind lookup for {}: country={:?}, region={:?}, city={:?}",
            ip, country, region, city_name
        );

        Some(GeoInfo {
            country,
            region,
            city: city_name,
        })
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
