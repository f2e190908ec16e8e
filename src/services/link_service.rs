//! Link management: creation with code issuance, listing, owner-checked
//! updates.

use tracing::info;

use crate::config::get_config;
use crate::errors::{LinkpulseError, Result};
use crate::storage::{LinkPatch, LinkWithCodes, NewLink, SeaOrmStorage};
use crate::utils::{generate_random_code, is_valid_short_code};
use crate::utils::url_validator::validate_url;
use migration::entities::link;

/// How many random-code collisions to tolerate before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Input for link creation, as received from the API layer.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Explicit campaign codes; empty means "generate one"
    pub custom_codes: Vec<String>,
}

/// One link as presented to its owner: record, codes, click count.
#[derive(Debug, Clone)]
pub struct LinkOverview {
    pub link: link::Model,
    pub short_codes: Vec<String>,
    pub short_links: Vec<String>,
    pub click_count: i64,
}

/// Create a link for `user_id`, issuing short codes.
pub async fn create_link(
    storage: &SeaOrmStorage,
    user_id: &str,
    input: CreateLink,
) -> Result<LinkWithCodes> {
    validate_url(&input.original_url)
        .map_err(|e| LinkpulseError::validation(format!("Invalid destination URL: {}", e)))?;

    let codes = if input.custom_codes.is_empty() {
        vec![issue_random_code(storage).await?]
    } else {
        for code in &input.custom_codes {
            if !is_valid_short_code(code) {
                return Err(LinkpulseError::validation(format!(
                    "Invalid short code '{}': only letters, digits, '-' and '_' are allowed",
                    code
                )));
            }
            if storage.code_exists(code).await? {
                return Err(LinkpulseError::conflict(format!(
                    "Short code '{}' already exists",
                    code
                )));
            }
        }
        input.custom_codes
    };

    let created = storage
        .create_link(NewLink {
            user_id: user_id.to_string(),
            original_url: input.original_url,
            title: input.title,
            description: input.description,
            codes,
        })
        .await?;

    info!(
        link_id = created.link.id,
        codes = ?created.codes,
        "Link created"
    );

    Ok(created)
}

async fn issue_random_code(storage: &SeaOrmStorage) -> Result<String> {
    let length = get_config().analytics.random_code_length;

    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_random_code(length);
        if !storage.code_exists(&code).await? {
            return Ok(code);
        }
    }

    Err(LinkpulseError::conflict(
        "Could not generate a unique short code, keyspace too dense",
    ))
}

/// List a user's links with codes, constructed short-link URLs and click
/// counts, newest first.
pub async fn list_links(storage: &SeaOrmStorage, user_id: &str) -> Result<Vec<LinkOverview>> {
    let base_url = get_config().server.base_url.trim_end_matches('/').to_string();

    let links = storage.list_links_for_user(user_id).await?;
    let link_ids: Vec<i64> = links.iter().map(|l| l.id).collect();

    let codes = storage.codes_for_links(&link_ids).await?;
    let counts = storage.count_clicks_per_link(&link_ids).await?;

    let overviews = links
        .into_iter()
        .map(|link| {
            let short_codes: Vec<String> = codes
                .iter()
                .filter(|row| row.link_id == link.id)
                .map(|row| row.code.clone())
                .collect();
            let short_links = short_codes
                .iter()
                .map(|code| format!("{}/{}", base_url, code))
                .collect();
            let click_count = counts
                .iter()
                .find(|(id, _)| *id == link.id)
                .map(|(_, count)| *count)
                .unwrap_or(0);

            LinkOverview {
                link,
                short_codes,
                short_links,
                click_count,
            }
        })
        .collect();

    Ok(overviews)
}

/// Apply a partial update to a link. Only the owner may update; the check
/// happens before anything is written.
pub async fn update_link(
    storage: &SeaOrmStorage,
    user_id: &str,
    link_id: i64,
    patch: LinkPatch,
) -> Result<link::Model> {
    let Some(existing) = storage.find_link_by_id(link_id).await? else {
        return Err(LinkpulseError::not_found(format!("Link {} not found", link_id)));
    };

    if existing.user_id != user_id {
        return Err(LinkpulseError::forbidden(
            "Only the link owner may update it",
        ));
    }

    storage.update_link(link_id, patch).await
}
