//! Database module - AppState and the employment record store
//!
//! - `records` - Postgres implementation of [`RecordStore`]

mod records;

pub use records::PgRecordStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::certificate::models::{EmployerReferenceRow, EmploymentRecord};
use crate::certificate::{CertificateGenerator, CertificateService, TypstRenderEngine};
use crate::config::Settings;
use crate::storage::{ObjectStorage, SupabaseStorage};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read side of the tabular store holding employment history.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every row for one ID, in table order.
    async fn get_records_by_id(&self, national_id: &str) -> Result<Vec<EmploymentRecord>, StoreError>;

    /// The employer alias table, in table order.
    async fn get_employer_reference_table(&self) -> Result<Vec<EmployerReferenceRow>, StoreError>;
}

#[derive(Clone)]
pub struct AppState {
    pub service: CertificateService,
}

impl AppState {
    pub async fn new(settings: Settings) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .idle_timeout(std::time::Duration::from_secs(900))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .connect(&settings.database_url)
            .await?;

        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(900))
            .user_agent(concat!("certificados-laborales/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let records: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));
        let storage: Arc<dyn ObjectStorage> = Arc::new(SupabaseStorage::new(
            settings.supabase.clone(),
            http_client,
        ));

        Ok(Self::new_with_parts(&settings, records, storage))
    }

    /// Wire the service from already-built collaborators.
    pub fn new_with_parts(
        settings: &Settings,
        records: Arc<dyn RecordStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let generator = Arc::new(CertificateGenerator::new(
            settings.letter.clone(),
            TypstRenderEngine::new(settings.typst_bin.clone()),
        ));
        let service = CertificateService::new(records, storage, generator, settings.policy.clone());

        AppState { service }
    }
}
