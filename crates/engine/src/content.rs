//! Content selection helpers for warming sends.

use warmline_core::error::CoreError;
use warmline_core::progression::ContentType;
use warmline_db::models::warming_content::WarmingContent;
use warmline_gateway::OutboundContent;

/// Maximum characters of body text kept in the activity log preview.
pub const PREVIEW_MAX_CHARS: usize = 80;

/// Short preview of a content item for the audit trail: truncated body text,
/// or the media reference for media content.
pub fn preview_of(content: &WarmingContent) -> Option<String> {
    if let Some(body) = &content.body {
        let preview: String = body.chars().take(PREVIEW_MAX_CHARS).collect();
        return Some(preview);
    }
    content.media_url.clone()
}

/// Build the gateway payload for a content row.
///
/// The content_type column is CHECK-constrained, so an unparseable value
/// indicates a corrupted row.
pub fn outbound_from(content: &WarmingContent) -> Result<OutboundContent, CoreError> {
    let content_type = ContentType::parse(&content.content_type).ok_or_else(|| {
        CoreError::Internal(format!(
            "Content {} has unknown content_type '{}'",
            content.id, content.content_type
        ))
    })?;
    Ok(OutboundContent {
        content_type,
        body: content.body.clone(),
        media_url: content.media_url.clone(),
    })
}
