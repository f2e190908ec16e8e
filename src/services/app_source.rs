//! App-source / channel attribution
//!
//! Maps a User-Agent string (or, in the alternative mode, a campaign
//! short-code prefix) to a human-readable traffic source label.
//!
//! The UA rule table is priority-ordered and evaluated first-match-wins.
//! Order is part of the contract: in-app browser UA strings usually also
//! carry generic browser tokens (a Facebook in-app webview still says
//! "Chrome"), so in-app tokens must be checked before browsers, and among
//! browsers the Chromium derivatives before Chrome, Chrome before Safari.

/// Ordered (substring, label) rules matched against the lower-cased UA.
const UA_RULES: &[(&str, &str)] = &[
    // In-app browsers first
    ("fban", "Facebook"),
    ("fbav", "Facebook"),
    ("fb_iab", "Facebook"),
    ("messenger", "Messenger"),
    ("zalo", "Zalo"),
    ("instagram", "Instagram"),
    ("tiktok", "TikTok"),
    ("musical_ly", "TikTok"),
    ("telegram", "Telegram"),
    ("twitter", "Twitter"),
    ("linkedin", "LinkedIn"),
    // Generic browsers, most-specific token first
    ("edg", "Browser: Edge"),
    ("opr", "Browser: Opera"),
    ("opera", "Browser: Opera"),
    ("firefox", "Browser: Firefox"),
    ("chrome", "Browser: Chrome"),
    ("safari", "Browser: Safari"),
];

/// Campaign prefix rules for short-code-keyed attribution.
const CODE_RULES: &[(&str, &str)] = &[
    ("fb", "Facebook"),
    ("zalo", "Zalo"),
    ("tiktok", "TikTok"),
    ("telegram", "Telegram"),
];

/// Detect the traffic source from a User-Agent string.
pub fn detect(user_agent: &str) -> String {
    let ua_lower = user_agent.to_lowercase();

    UA_RULES
        .iter()
        .find(|(token, _)| ua_lower.contains(token))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Detect the traffic source from a campaign short-code prefix.
pub fn detect_from_code(short_code: &str) -> String {
    let code_lower = short_code.to_lowercase();

    CODE_RULES
        .iter()
        .find(|(prefix, _)| code_lower.starts_with(prefix))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
