use tracing::{info, instrument};

use crate::entity::{Badge, Chapter, ChapterPatch};
use crate::error::AdminError;
use crate::repository::Repository;

/// Mark the badge's chapter as the checkpoint for the badge's tier.
#[instrument(skip_all, fields(badge = badge.id, chapter = badge.chapter_id))]
pub async fn sync_badge_checkpoint(
    chapters: &dyn Repository<Chapter>,
    badge: &Badge,
) -> Result<(), AdminError> {
    let level = badge.badge_type.checkpoint_level();
    let patch = ChapterPatch {
        is_checkpoint: Some(level),
        ..Default::default()
    };
    chapters.update(badge.chapter_id, &patch).await?;
    info!(level, "Chapter checkpoint updated");
    Ok(())
}
