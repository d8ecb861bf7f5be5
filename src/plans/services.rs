use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{blocks, items};

use super::repo;

/// Replace the target plan's entire block/item graph with a copy of the
/// source plan's. One transaction end to end: if anything fails after the
/// target check, the transaction rolls back on drop and the target keeps its
/// pre-copy state. Partial copies are never observable.
///
/// The overlap validator is deliberately bypassed: the source block set was
/// validated when it was created, and the target is empty once its blocks
/// are deleted, so per-block checks would have nothing to conflict with.
pub async fn copy_plan(
    db: &PgPool,
    source_plan_id: Uuid,
    target_plan_id: Uuid,
) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;

    // Source existence is not checked: copying from an absent or empty
    // source legitimately yields an empty target.
    if !repo::lock_tx(&mut tx, target_plan_id).await? {
        return Err(ApiError::NotFound("target plan"));
    }

    copy_graph(&mut tx, source_plan_id, target_plan_id)
        .await
        .map_err(|e| {
            error!(error = %e, %source_plan_id, %target_plan_id, "plan copy failed, rolling back");
            ApiError::CopyFailed
        })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, %source_plan_id, %target_plan_id, "plan copy commit failed");
        ApiError::CopyFailed
    })?;

    info!(%source_plan_id, %target_plan_id, "plan copied");
    Ok(())
}

async fn copy_graph(
    tx: &mut Transaction<'_, Postgres>,
    source_plan_id: Uuid,
    target_plan_id: Uuid,
) -> sqlx::Result<()> {
    // Full replace, not a merge. Items cascade with their blocks.
    blocks::repo::delete_by_plan_tx(tx, target_plan_id).await?;

    // Source blocks in insertion order; each insert returns the new block
    // directly, so source block i maps to its copy by construction.
    let source_blocks = blocks::repo::list_by_plan_tx(tx, source_plan_id, None).await?;
    for old in source_blocks {
        let new_block = blocks::repo::insert_tx(
            tx,
            target_plan_id,
            &old.block_type,
            old.time_start,
            old.time_end,
        )
        .await?;

        let old_items = items::repo::list_by_block_tx(tx, old.id).await?;
        for item in old_items {
            items::repo::insert_tx(
                tx,
                new_block.id,
                item.dish_id,
                item.amount,
                item.note.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}
