use tracing::{debug, info, instrument};

use super::confirm::Confirm;
use super::save::DeleteOutcome;
use crate::entity::{Record, Validate};
use crate::error::AdminError;
use crate::repository::Repository;

/// Create a record that carries no asset and read it back.
#[instrument(skip_all, fields(kind = %E::KIND))]
pub async fn create_record<E: Record>(
    records: &dyn Repository<E>,
    draft: &E::Draft,
) -> Result<E, AdminError> {
    draft.validate()?;
    let id = records.create(draft).await?;
    info!(id, "Record created");
    records.get(id).await
}

#[instrument(skip(records, patch), fields(kind = %E::KIND))]
pub async fn update_record<E: Record>(
    records: &dyn Repository<E>,
    id: i32,
    patch: &E::Patch,
) -> Result<E, AdminError> {
    patch.validate()?;
    records.update(id, patch).await?;
    info!("Record updated");
    records.get(id).await
}

/// Delete after confirmation. Declining makes no calls.
#[instrument(skip(records, confirm), fields(kind = %E::KIND))]
pub async fn delete_record<E: Record>(
    records: &dyn Repository<E>,
    id: i32,
    confirm: &dyn Confirm,
) -> Result<DeleteOutcome, AdminError> {
    if !confirm.confirm(&format!("Delete {} {id}?", E::KIND)) {
        debug!("Delete cancelled");
        return Ok(DeleteOutcome::Cancelled);
    }
    records.delete(id).await?;
    info!("Record deleted");
    Ok(DeleteOutcome::Deleted)
}
