use std::sync::Arc;

use common::retry::{RetryPolicy, retry_with_backoff};
use common::storage::{ObjectPath, ObjectStore};
use tracing::{debug, error, info, instrument, warn};

use super::confirm::Confirm;
use super::guard::InFlight;
use super::upload::Upload;
use crate::entity::{AssetBacked, AssetFields, AssetRef, Validate};
use crate::error::AdminError;
use crate::repository::Repository;

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The operator declined the confirmation; nothing was called.
    Cancelled,
}

/// Coordinates a record and its single asset across the repository and the object store.
///
/// One orchestrator stands for one form: its workflows share an [`InFlight`]
/// flag, so overlapping saves on the same instance fail with [`AdminError::Busy`].
pub struct SaveOrchestrator<E: AssetBacked> {
    records: Arc<dyn Repository<E>>,
    store: Arc<dyn ObjectStore>,
    patch_retry: RetryPolicy,
    in_flight: InFlight,
}

impl<E> SaveOrchestrator<E>
where
    E: AssetBacked,
    E::Draft: AssetFields,
    E::Patch: AssetFields,
{
    pub fn new(
        records: Arc<dyn Repository<E>>,
        store: Arc<dyn ObjectStore>,
        patch_retry: RetryPolicy,
    ) -> Self {
        Self {
            records,
            store,
            patch_retry,
            in_flight: InFlight::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Create a record, upload its asset under the new id, then point the record at it.
    #[instrument(skip_all, fields(kind = %E::KIND))]
    pub async fn create(&self, mut draft: E::Draft, file: Option<Upload>) -> Result<E, AdminError> {
        let _guard = self.in_flight.begin()?;

        draft.validate()?;
        if E::ASSET_REQUIRED && file.is_none() {
            return Err(AdminError::MissingAsset(E::KIND));
        }

        draft.set_asset(AssetRef::Pending);
        let id = self.records.create(&draft).await?;
        info!(id, "Record created with pending asset");

        let Some(file) = file else {
            return self.records.get(id).await;
        };

        let url = match self.upload(id, &file).await {
            Ok(url) => url,
            Err(e) => {
                warn!(id, error = %e, "Upload failed, removing new record");
                if let Err(cleanup) = self.records.delete(id).await {
                    error!(id, error = %cleanup, "Failed to remove record after upload failure");
                }
                return Err(e);
            }
        };

        let result = retry_with_backoff(&self.patch_retry, "asset reference update", || {
            let mut patch = E::Patch::default();
            patch.set_asset(AssetRef::Url(url.clone()));
            let records = Arc::clone(&self.records);
            async move { records.update(id, &patch).await }
        })
        .await;

        if let Err(exhausted) = result {
            let failures: Vec<&str> = exhausted
                .history
                .iter()
                .map(|a| a.error.as_str())
                .collect();
            error!(
                id,
                %url,
                attempts = exhausted.attempts,
                ?failures,
                "Record saved but asset reference was not updated"
            );
            return Err(AdminError::PartialSave {
                kind: E::KIND,
                id,
                url,
                attempts: exhausted.attempts,
                source: Box::new(exhausted.last_error),
            });
        }

        info!(id, %url, "Record saved");
        self.records.get(id).await
    }

    /// Apply `patch`, replacing the asset when a new file is given.
    ///
    /// `previous` is the record's current reference; its object is removed
    /// before the new one is uploaded.
    #[instrument(skip(self, previous, patch, file), fields(kind = %E::KIND))]
    pub async fn edit(
        &self,
        id: i32,
        previous: &AssetRef,
        mut patch: E::Patch,
        file: Option<Upload>,
    ) -> Result<E, AdminError> {
        let _guard = self.in_flight.begin()?;

        patch.validate()?;

        if let Some(file) = file {
            self.discard(id, previous).await;
            let url = self.upload(id, &file).await?;
            patch.set_asset(AssetRef::Url(url));
        }

        self.records.update(id, &patch).await?;
        info!("Record updated");
        self.records.get(id).await
    }

    /// Delete the record and, first, its asset. Declining `confirm` makes no calls.
    ///
    /// If the record delete fails after the asset was removed, the record is
    /// left pointing at a missing object.
    #[instrument(skip(self, asset, confirm), fields(kind = %E::KIND))]
    pub async fn delete(
        &self,
        id: i32,
        asset: &AssetRef,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, AdminError> {
        let _guard = self.in_flight.begin()?;

        if !Self::confirmed(id, confirm) {
            return Ok(DeleteOutcome::Cancelled);
        }
        self.remove_record(id, asset).await
    }

    /// Like [`SaveOrchestrator::delete`], but looks the asset up after the
    /// operator confirmed.
    #[instrument(skip(self, confirm), fields(kind = %E::KIND))]
    pub async fn delete_by_id(
        &self,
        id: i32,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, AdminError> {
        let _guard = self.in_flight.begin()?;

        if !Self::confirmed(id, confirm) {
            return Ok(DeleteOutcome::Cancelled);
        }
        let current = self.records.get(id).await?;
        self.remove_record(id, current.asset()).await
    }

    fn confirmed(id: i32, confirm: &dyn Confirm) -> bool {
        let accepted = confirm.confirm(&format!("Delete {} {id}?", E::KIND));
        if !accepted {
            debug!("Delete cancelled");
        }
        accepted
    }

    async fn remove_record(&self, id: i32, asset: &AssetRef) -> Result<DeleteOutcome, AdminError> {
        self.discard(id, asset).await;
        self.records.delete(id).await?;
        info!("Record deleted");
        Ok(DeleteOutcome::Deleted)
    }

    async fn upload(&self, id: i32, file: &Upload) -> Result<String, AdminError> {
        let path = ObjectPath::for_upload(E::KIND.as_str(), id, &file.file_name)?;
        self.store
            .upload(&path, &file.bytes, file.content_type())
            .await?;
        let url = self.store.public_url(&path);
        debug!(%path, %url, size = file.bytes.len(), "Asset uploaded");
        Ok(url)
    }

    /// Best-effort removal of the object behind `asset`.
    async fn discard(&self, id: i32, asset: &AssetRef) {
        let Some(url) = asset.url() else {
            return;
        };
        let Some(path) = self.store.path_from_url(url) else {
            warn!(id, %url, "Asset URL does not belong to this bucket, leaving it");
            return;
        };
        if let Err(e) = self.store.remove(std::slice::from_ref(&path)).await {
            warn!(id, %path, error = %e, "Failed to remove previous asset");
        }
    }
}
