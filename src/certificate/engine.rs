//! Typst rendering engine.
//!
//! Handles the low-level details of writing Typst source and its assets to a
//! temporary directory, invoking the compiler, and reading back the PDF.

use std::fs;
use std::process::Command;
use tempfile::{tempdir, TempDir};

use super::traits::RenderEngine;
use super::GeneratorError;

const SOURCE_FILE: &str = "certificado.typ";
const OUTPUT_FILE: &str = "certificado.pdf";

/// A file the Typst source refers to by name, e.g. a signature image.
#[derive(Debug, Clone)]
pub struct RenderAsset {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Renders Typst source to PDF through the `typst` CLI.
#[derive(Debug, Clone)]
pub struct TypstRenderEngine {
    binary: String,
}

impl TypstRenderEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn compile(&self, temp_dir: &TempDir) -> Result<Vec<u8>, GeneratorError> {
        let typ_path = temp_dir.path().join(SOURCE_FILE);
        let output_path = temp_dir.path().join(OUTPUT_FILE);

        let output = Command::new(&self.binary)
            .arg("compile")
            .arg(&typ_path)
            .arg(&output_path)
            .current_dir(temp_dir.path())
            .output()
            .map_err(GeneratorError::TypstIo)?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            log::error!(
                "typst exited with status {}: {}",
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(GeneratorError::TypstExit(code));
        }

        fs::read(&output_path).map_err(GeneratorError::ReadPdf)
    }
}

impl RenderEngine for TypstRenderEngine {
    /// Compile `typst_source` with `assets` placed beside it.
    fn render(&self, typst_source: &str, assets: &[RenderAsset]) -> Result<Vec<u8>, GeneratorError> {
        let temp_dir = tempdir().map_err(GeneratorError::TempDir)?;

        fs::write(temp_dir.path().join(SOURCE_FILE), typst_source)
            .map_err(GeneratorError::WriteTypst)?;
        for asset in assets {
            fs::write(temp_dir.path().join(&asset.file_name), &asset.bytes)
                .map_err(GeneratorError::WriteTypst)?;
        }

        self.compile(&temp_dir)
    }
}

impl Default for TypstRenderEngine {
    fn default() -> Self {
        Self::new("typst")
    }
}
