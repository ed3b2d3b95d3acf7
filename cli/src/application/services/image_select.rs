//! Boot image selection.
//!
//! Listing failures are fatal; they are not routed through the throttle retry.

use anyhow::Result;
use chrono::Utc;

use crate::application::ports::{ComputeProvider, ImageQuery};
use crate::application::services::instance::into_provider_error;
use crate::application::unit_log::UnitLog;
use crate::domain::image::{NamePattern, pick_newest};
use crate::domain::{Image, ImageCriteria, NoMatchError};

/// Select the newest image matching `criteria`.
///
/// Pages through the provider listing until no continuation token is
/// returned, then applies the name pattern and picks the newest survivor.
///
/// # Errors
///
/// Returns a `ProviderError` if a listing call fails, or a [`NoMatchError`]
/// if no image survives the filters.
pub async fn select_image(
    compute: &impl ComputeProvider,
    criteria: &ImageCriteria,
    log: &UnitLog<'_>,
) -> Result<Image> {
    let pattern = criteria
        .name_pattern
        .as_deref()
        .map(NamePattern::new)
        .transpose()?;
    let query = ImageQuery {
        owners: &criteria.owners,
        filters: &criteria.filters,
    };

    let mut candidates = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let page = compute
            .list_images(&query, next_token.as_deref())
            .await
            .map_err(|e| into_provider_error("list images", e))?;
        candidates.extend(page.images);
        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }
    log.debug(&format!("{} candidate images listed", candidates.len()));

    let image = pick_newest(&candidates, pattern.as_ref(), Utc::now()).ok_or_else(|| {
        NoMatchError {
            criteria: criteria.describe(),
        }
    })?;
    log.info(&format!("selected image {} ({})", image.id, image.name));
    Ok(image)
}
