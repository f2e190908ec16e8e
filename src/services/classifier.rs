//! Client classifier
//!
//! Parses a raw User-Agent string into device type, device name, OS and
//! browser using woothee. Pure function of its input: absent signals degrade
//! to documented defaults, never an error.

use woothee::parser::Parser;

/// Classification result for one User-Agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedClient {
    /// "Mobile", "Tablet", "Desktop" or "Bot"; "Desktop" when no signal
    pub device_type: String,
    /// Vendor+OS for mobile/tablet, OS-derived for desktop, "Unknown" fallback
    pub device_name: String,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
}

impl Default for ClassifiedClient {
    fn default() -> Self {
        Self {
            device_type: "Desktop".to_string(),
            device_name: "Unknown".to_string(),
            browser: None,
            browser_version: None,
            os: None,
            os_version: None,
        }
    }
}

/// Classify a raw User-Agent string.
pub fn classify(user_agent: &str) -> ClassifiedClient {
    if user_agent.trim().is_empty() {
        return ClassifiedClient::default();
    }

    let parser = Parser::new();
    let result = parser.parse(user_agent).unwrap_or_default();

    let browser = if result.name != "UNKNOWN" && !result.name.is_empty() {
        Some(result.name.to_string())
    } else {
        None
    };
    let browser_version = if !result.version.is_empty() && result.version != "UNKNOWN" {
        Some(result.version.to_string())
    } else {
        None
    };
    let os = if result.os != "UNKNOWN" && !result.os.is_empty() {
        Some(result.os.to_string())
    } else {
        None
    };
    let os_version = if !result.os_version.is_empty() && result.os_version != "UNKNOWN" {
        Some(result.os_version.to_string())
    } else {
        None
    };
    let vendor = if result.vendor != "UNKNOWN" && !result.vendor.is_empty() {
        Some(result.vendor.to_string())
    } else {
        None
    };

    let device_type = device_type_of(result.category, user_agent);
    let device_name = device_name_of(&device_type, vendor.as_deref(), os.as_deref());

    ClassifiedClient {
        device_type,
        device_name,
        browser,
        browser_version,
        os,
        os_version,
    }
}

fn device_type_of(category: &str, user_agent: &str) -> String {
    let ua_lower = user_agent.to_lowercase();

    match category {
        "crawler" => "Bot".to_string(),
        "smartphone" | "mobilephone" => {
            // woothee files iPads under smartphone; split tablets out
            if ua_lower.contains("ipad") || ua_lower.contains("tablet") {
                "Tablet".to_string()
            } else {
                "Mobile".to_string()
            }
        }
        _ if ua_lower.contains("ipad") || ua_lower.contains("tablet") => "Tablet".to_string(),
        _ => "Desktop".to_string(),
    }
}

fn device_name_of(device_type: &str, vendor: Option<&str>, os: Option<&str>) -> String {
    match device_type {
        "Mobile" | "Tablet" => match (vendor, os) {
            (Some(vendor), Some(os)) => format!("{} {}", vendor, os),
            (Some(vendor), None) => vendor.to_string(),
            (None, Some(os)) => os.to_string(),
            (None, None) => "Unknown".to_string(),
        },
        "Desktop" => match os {
            Some("Mac OSX") | Some("Mac OS X") | Some("macOS") => "Mac".to_string(),
            Some(os) if os.starts_with("Windows") => "Windows PC".to_string(),
            Some(os) => os.to_string(),
            None => "Unknown".to_string(),
        },
        _ => "Unknown".to_string(),
    }
}
