mod rest;

use async_trait::async_trait;

use crate::entity::Record;
use crate::error::AdminError;

pub use rest::{ApiClient, HttpRepository};

/// CRUD access to one record type on the LMS backend.
#[async_trait]
pub trait Repository<E: Record>: Send + Sync {
    /// Create a record and return the id the backend assigned.
    async fn create(&self, draft: &E::Draft) -> Result<i32, AdminError>;

    /// Shallow-merge `patch` into the stored record. Unset fields are left unchanged.
    async fn update(&self, id: i32, patch: &E::Patch) -> Result<(), AdminError>;

    async fn delete(&self, id: i32) -> Result<(), AdminError>;

    async fn get(&self, id: i32) -> Result<E, AdminError>;

    async fn list(&self) -> Result<Vec<E>, AdminError>;
}
