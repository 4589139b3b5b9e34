#![allow(dead_code)]

use async_trait::async_trait;
use certificados_laborales::certificate::models::{EmployerReferenceRow, EmploymentRecord};
use certificados_laborales::certificate::narrative::NarrativeData;
use certificados_laborales::certificate::{
    CertificateService, Generator, GeneratorError, NarrativePolicy, RenderedDocument,
};
use certificados_laborales::db::{AppState, RecordStore, StoreError};
use certificados_laborales::storage::{ObjectStorage, StorageError, StoredObject};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn record(
    national_id: &str,
    employer: &str,
    title: &str,
    entry: &str,
    exit: &str,
    salary: Option<&str>,
) -> EmploymentRecord {
    EmploymentRecord {
        national_id: national_id.to_string(),
        employee_name: "Ana María Ruiz".to_string(),
        employer_name: employer.to_string(),
        job_title: title.to_string(),
        entry_date: entry.to_string(),
        exit_date: exit.to_string(),
        base_salary: salary.map(str::to_string),
    }
}

pub fn employer_row(aliases: &str, tax_id: &str) -> EmployerReferenceRow {
    EmployerReferenceRow {
        alias_list: Some(aliases.to_string()),
        tax_id: Some(tax_id.to_string()),
    }
}

/// In-memory record store holding rows for any number of IDs.
pub struct MockRecordStore {
    records: Vec<EmploymentRecord>,
    employers: Vec<EmployerReferenceRow>,
}

impl MockRecordStore {
    pub fn new(records: Vec<EmploymentRecord>, employers: Vec<EmployerReferenceRow>) -> Self {
        Self { records, employers }
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn get_records_by_id(&self, national_id: &str) -> Result<Vec<EmploymentRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.national_id.trim() == national_id.trim())
            .cloned()
            .collect())
    }

    async fn get_employer_reference_table(&self) -> Result<Vec<EmployerReferenceRow>, StoreError> {
        Ok(self.employers.clone())
    }
}

/// Mock implementation of ObjectStorage for testing
pub struct MockObjectStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_when_contains: Option<String>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            fail_when_contains: None,
        }
    }

    /// Reject uploads whose file name contains `needle`.
    pub fn failing_for(needle: &str) -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            fail_when_contains: Some(needle.to_string()),
        }
    }

    pub async fn has_file(&self, filename: &str) -> bool {
        self.files.lock().await.contains_key(filename)
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<StoredObject, StorageError> {
        if let Some(needle) = &self.fail_when_contains {
            if filename.contains(needle.as_str()) {
                return Err(StorageError::Rejected {
                    status: 503,
                    body: "storage unavailable".to_string(),
                });
            }
        }
        self.files
            .lock()
            .await
            .insert(filename.to_string(), file_data.to_vec());
        Ok(StoredObject {
            id: filename.to_string(),
            view_link: self.get_asset_url(filename),
        })
    }

    fn get_asset_url(&self, filename: &str) -> String {
        format!("http://test.example.com/{}", filename)
    }
}

/// Generator that skips Typst and can be told to fail for some employers.
pub struct StubGenerator {
    fail_for: Vec<String>,
    pub calls: AtomicUsize,
    pub rendered: std::sync::Mutex<Vec<NarrativeData>>,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::failing_for(&[])
    }

    pub fn failing_for(employers: &[&str]) -> Self {
        Self {
            fail_for: employers.iter().map(|e| e.to_string()).collect(),
            calls: AtomicUsize::new(0),
            rendered: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Generator<NarrativeData> for StubGenerator {
    fn generate(&self, request: NarrativeData) -> Result<RenderedDocument, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_for.contains(&request.employer_name) {
            return Err(GeneratorError::TypstExit(1));
        }
        let filename = certificados_laborales::certificate::common::certificate_filename(
            &request.employee_name,
            &request.employer_name,
            &request.national_id,
        );
        if let Ok(mut rendered) = self.rendered.lock() {
            rendered.push(request);
        }
        Ok(RenderedDocument {
            filename,
            pdf: b"%PDF-1.7 stub".to_vec(),
        })
    }
}

pub fn service(
    store: MockRecordStore,
    storage: Arc<MockObjectStorage>,
    generator: Arc<StubGenerator>,
) -> CertificateService {
    CertificateService::new(Arc::new(store), storage, generator, NarrativePolicy::default())
}

pub fn app_state(service: CertificateService) -> AppState {
    AppState { service }
}
