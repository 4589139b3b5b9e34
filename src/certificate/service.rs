//! Certificate service - one request from ID to uploaded documents.
//!
//! Groups are rendered and uploaded one after another. A group that fails is
//! recorded in the report and the loop moves on; the request as a whole only
//! fails when no group made it.

use chrono::NaiveDate;
use log::{error, info};
use std::sync::Arc;
use thiserror::Error;

use super::common::certificate_filename;
use super::employer::EmployerDirectory;
use super::grouping::group_by_employer;
use super::models::{IssueOutcome, IssueReport, IssueRequest, VerificationSummary, VerifyRequest};
use super::narrative::{latest_position, IssueContext, NarrativeBuilder, NarrativeData, NarrativePolicy};
use super::traits::{Generator, Validator};
use super::validation::normalize_national_id;
use crate::db::{RecordStore, StoreError};
use crate::metrics;
use crate::storage::ObjectStorage;

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("no se encontró ningún registro para la cédula {0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no se pudo generar ningún certificado")]
    NothingGenerated(IssueReport),
}

#[derive(Clone)]
pub struct CertificateService {
    records: Arc<dyn RecordStore>,
    storage: Arc<dyn ObjectStorage>,
    generator: Arc<dyn Generator<NarrativeData>>,
    policy: Arc<NarrativePolicy>,
}

impl CertificateService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        storage: Arc<dyn ObjectStorage>,
        generator: Arc<dyn Generator<NarrativeData>>,
        policy: NarrativePolicy,
    ) -> Self {
        Self {
            records,
            storage,
            generator,
            policy: Arc::new(policy),
        }
    }

    /// Latest title and status across every employer, newest entry date first.
    pub async fn verify(&self, request: &VerifyRequest) -> Result<VerificationSummary, CertificateError> {
        request.validate().map_err(CertificateError::Validation)?;
        let national_id = normalize_national_id(&request.national_id);

        let records = self.records.get_records_by_id(&national_id).await?;
        let (latest_title, active) =
            latest_position(&records).ok_or(CertificateError::NotFound(national_id))?;

        Ok(VerificationSummary {
            latest_title,
            active,
        })
    }

    /// Generate and upload one certificate per employer.
    pub async fn issue(&self, request: &IssueRequest, today: NaiveDate) -> Result<IssueReport, CertificateError> {
        request.validate().map_err(CertificateError::Validation)?;
        let national_id = normalize_national_id(&request.national_id);

        let records = self.records.get_records_by_id(&national_id).await?;
        if records.is_empty() {
            return Err(CertificateError::NotFound(national_id));
        }

        let reference = self.records.get_employer_reference_table().await?;
        let directory = EmployerDirectory::from_reference_rows(&reference);
        let groups = group_by_employer(records, &directory);
        info!(
            "Issuing certificates for {}: {} employer group(s), {} known aliases",
            national_id,
            groups.len(),
            directory.len()
        );

        let builder = NarrativeBuilder::new(&self.policy, &directory);
        let ctx = IssueContext {
            national_id: &national_id,
            contract_type: &request.contract_type,
            salary_override: request.salary_override.as_deref(),
            today,
        };

        let mut report = IssueReport::default();
        for group in &groups {
            let Some(narrative) = builder.build(group, &ctx) else {
                continue;
            };
            let outcome = self.issue_one(narrative).await;
            metrics::record_outcome(outcome.is_success());
            report.outcomes.push(outcome);
        }

        if report.success_count() == 0 {
            error!("Every certificate failed for {}", national_id);
            return Err(CertificateError::NothingGenerated(report));
        }

        info!(
            "Issued {}/{} certificates for {}",
            report.success_count(),
            report.outcomes.len(),
            national_id
        );
        Ok(report)
    }

    async fn issue_one(&self, narrative: NarrativeData) -> IssueOutcome {
        let employer = narrative.employer_name.clone();
        let filename = certificate_filename(
            &narrative.employee_name,
            &narrative.employer_name,
            &narrative.national_id,
        );

        let generator = self.generator.clone();
        let document = match tokio::task::spawn_blocking(move || generator.generate(narrative)).await {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => {
                error!("Rendering certificate for '{}' failed: {}", employer, e);
                return IssueOutcome::failed(employer, filename, e);
            }
            Err(e) => {
                error!("Rendering task for '{}' aborted: {}", employer, e);
                return IssueOutcome::failed(employer, filename, e);
            }
        };

        match self.storage.upload_file(&document.filename, &document.pdf).await {
            Ok(stored) => IssueOutcome::succeeded(employer, document.filename, stored.view_link),
            Err(e) => {
                error!("Uploading {} failed: {}", document.filename, e);
                IssueOutcome::failed(employer, document.filename, e)
            }
        }
    }
}
