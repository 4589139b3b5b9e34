//! Certificate module - employment certificates from raw employment records.
//!
//! The pipeline runs leaf-first:
//! - `employer` - alias lookup from the employer reference table
//! - `grouping` - partition of one person's records by canonical employer
//! - `narrative` - sentences and flags for each employer group
//! - `document` - block layout and Typst source, compiled by `engine`
//! - `service` - the request-level loop with per-employer failure isolation

pub mod common;
pub mod document;
pub mod employer;
pub mod engine;
pub mod grouping;
pub mod handlers;
pub mod models;
pub mod narrative;
pub mod numbers;
pub mod pages;
pub mod service;
pub mod traits;
pub mod validation;

pub use document::{CertificateGenerator, LetterSettings};
pub use employer::{EmployerDirectory, EmployerIdentity};
pub use engine::TypstRenderEngine;
pub use grouping::{group_by_employer, ContractGroup};
pub use narrative::{NarrativeBuilder, NarrativeData, NarrativePolicy};
pub use service::{CertificateError, CertificateService};
pub use traits::{Generator, RenderEngine, Validator};

use thiserror::Error;

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {0}")]
    TypstExit(i32),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
}

/// A rendered certificate ready for upload.
#[derive(Debug)]
pub struct RenderedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
}
