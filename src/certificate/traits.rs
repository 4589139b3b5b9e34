//! Traits for the certificate pipeline seams.

use super::engine::RenderAsset;
use super::{GeneratorError, RenderedDocument};

/// Trait for validating request objects.
pub trait Validator {
    /// Validate the state of the object.
    fn validate(&self) -> Result<(), String>;
}

/// Trait for document generators.
pub trait Generator<Req>: Send + Sync {
    /// Generate a document from the request.
    fn generate(&self, request: Req) -> Result<RenderedDocument, GeneratorError>;
}

/// Compiles document source, with the named assets beside it, into a PDF.
pub trait RenderEngine: Send + Sync {
    fn render(&self, source: &str, assets: &[RenderAsset]) -> Result<Vec<u8>, GeneratorError>;
}
