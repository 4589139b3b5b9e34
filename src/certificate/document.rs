//! Certificate layout.
//!
//! A certificate is an ordered list of [`Block`]s. Pagination is left to
//! Typst: every block flows into the single text area of a US-letter page with
//! one-inch margins and spills over to new pages with the same footer.

use std::fs;
use std::path::{Path, PathBuf};

use super::common::{certificate_filename, escape_typst_string, CURRENT_DATE_MARKER};
use super::engine::RenderAsset;
use super::narrative::NarrativeData;
use super::traits::{Generator, RenderEngine};
use super::{GeneratorError, RenderedDocument};

/// Extra space above the employer name on pre-printed letterhead.
const LETTERHEAD_SPACER_PT: f32 = 108.0;
const SIGNATURE_RULE: &str = "_______________________________";
const SIGNATURE_ASSET_STEM: &str = "firma";

/// Fixed text around the narrative: who signs and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterSettings {
    pub signer_name: String,
    pub signer_department: String,
    pub signer_phone: String,
    pub issue_city: String,
    pub company_address: Vec<String>,
    /// Print the address in the running footer instead of after the signature.
    pub address_in_footer: bool,
    pub signature_path: Option<PathBuf>,
}

impl Default for LetterSettings {
    fn default() -> Self {
        Self {
            signer_name: String::new(),
            signer_department: "Departamento Gestión Humana".to_string(),
            signer_phone: String::new(),
            issue_city: "Yumbo".to_string(),
            company_address: Vec::new(),
            address_in_footer: false,
            signature_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Plain(String),
    Bold(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    EmployerName,
    TaxId,
    Heading,
    Body,
    Period,
    Signature,
    Contact,
    Address,
}

struct StyleSpec {
    size_pt: f32,
    bold: bool,
    align: &'static str,
    justify: bool,
    indent_in: f32,
    space_after_pt: f32,
}

impl Style {
    fn spec(self) -> StyleSpec {
        let body = StyleSpec {
            size_pt: 11.0,
            bold: false,
            align: "left",
            justify: true,
            indent_in: 0.0,
            space_after_pt: 12.0,
        };
        match self {
            Style::EmployerName => StyleSpec {
                size_pt: 16.0,
                bold: true,
                align: "center",
                justify: false,
                space_after_pt: 6.0,
                ..body
            },
            Style::TaxId => StyleSpec {
                size_pt: 18.0,
                bold: true,
                align: "center",
                justify: false,
                space_after_pt: 24.0,
                ..body
            },
            Style::Heading => StyleSpec {
                size_pt: 12.0,
                bold: true,
                align: "center",
                justify: false,
                space_after_pt: 6.0,
                ..body
            },
            Style::Body => body,
            Style::Period => StyleSpec {
                size_pt: 10.0,
                indent_in: 0.3,
                ..body
            },
            Style::Signature => StyleSpec {
                bold: true,
                justify: false,
                space_after_pt: 6.0,
                ..body
            },
            Style::Contact => StyleSpec {
                size_pt: 10.0,
                justify: false,
                space_after_pt: 3.0,
                ..body
            },
            Style::Address => StyleSpec {
                size_pt: 9.0,
                align: "center",
                justify: false,
                space_after_pt: 3.0,
                ..body
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Spacer(f32),
    Paragraph { style: Style, spans: Vec<Span> },
    /// Signature image by asset file name, or the underscore rule when absent.
    Signature(Option<String>),
}

impl Block {
    fn text(style: Style, text: impl Into<String>) -> Self {
        Block::Paragraph {
            style,
            spans: vec![Span::Plain(text.into())],
        }
    }

    fn bold(style: Style, text: impl Into<String>) -> Self {
        Block::Paragraph {
            style,
            spans: vec![Span::Bold(text.into())],
        }
    }
}

/// Lay out the certificate content in reading order.
pub fn compose(data: &NarrativeData, letter: &LetterSettings, signature: Option<&str>) -> Vec<Block> {
    let mut blocks = Vec::new();

    if data.extra_top_margin {
        blocks.push(Block::Spacer(LETTERHEAD_SPACER_PT));
    }

    blocks.push(Block::bold(Style::EmployerName, data.employer_name.to_uppercase()));
    blocks.push(Block::bold(Style::TaxId, data.employer_tax_id.clone()));
    blocks.push(Block::bold(Style::Heading, "CERTIFICA QUE"));
    blocks.push(Block::Spacer(18.0));

    blocks.push(Block::Paragraph {
        style: Style::Body,
        spans: vec![
            Span::Plain("El(la) Señor(a) ".into()),
            Span::Bold(data.employee_name.clone()),
            Span::Plain(" identificado(a) con Cédula de Ciudadanía No ".into()),
            Span::Bold(data.national_id.clone()),
            Span::Plain(" prestó sus servicios para esta empresa en los siguientes periodos:".into()),
        ],
    });

    for period in &data.closed_periods {
        blocks.push(Block::text(Style::Period, format!("• {period}")));
    }
    if let Some(active) = &data.active_period {
        blocks.push(Block::text(
            Style::Period,
            format!(
                "• Desde el {} hasta {}, desempeñando el cargo de {}.",
                active.entry_date, CURRENT_DATE_MARKER, active.job_title
            ),
        ));
    }

    let clause = if data.context_clause.starts_with('.') {
        data.context_clause.clone()
    } else {
        format!(" {}", data.context_clause)
    };
    blocks.push(Block::Paragraph {
        style: Style::Body,
        spans: vec![
            Span::Plain("Mediante contrato de ".into()),
            Span::Bold(data.contract_type.clone()),
            Span::Plain(clause),
        ],
    });

    if !data.salary_display.is_empty() {
        blocks.push(Block::Paragraph {
            style: Style::Body,
            spans: vec![
                Span::Plain("Con un salario básico mensual de ".into()),
                Span::Bold(data.salary_display.clone()),
                Span::Plain(" (".into()),
                Span::Bold(data.salary_words.clone()),
                Span::Plain(").".into()),
            ],
        });
    }

    blocks.push(Block::text(
        Style::Body,
        format!(
            "Para constancia de lo anterior se firma en {} a los {} ({}) días del mes de {} de {}.",
            letter.issue_city, data.day_words, data.day_number, data.month, data.year
        ),
    ));
    blocks.push(Block::Spacer(18.0));
    blocks.push(Block::text(Style::Body, "Cordialmente,"));
    blocks.push(Block::Spacer(36.0));

    blocks.push(Block::Signature(signature.map(str::to_string)));
    if !letter.signer_name.is_empty() {
        blocks.push(Block::bold(Style::Signature, letter.signer_name.clone()));
    }
    if !letter.signer_department.is_empty() {
        blocks.push(Block::text(Style::Contact, letter.signer_department.clone()));
    }
    if !letter.signer_phone.is_empty() {
        blocks.push(Block::text(Style::Contact, format!("Celular: {}", letter.signer_phone)));
    }
    if !letter.issue_city.is_empty() {
        blocks.push(Block::text(Style::Contact, letter.issue_city.clone()));
    }

    if !letter.address_in_footer && !letter.company_address.is_empty() {
        blocks.push(Block::Spacer(12.0));
        for line in &letter.company_address {
            blocks.push(Block::text(Style::Address, line.clone()));
        }
    }

    blocks
}

/// Typst source for the page setup plus every block.
pub fn to_typst(blocks: &[Block], letter: &LetterSettings) -> String {
    let mut out = String::new();

    out.push_str("#set page(\n  paper: \"us-letter\",\n  margin: 1in,\n  footer: context [\n    #set text(size: 9pt)\n");
    if letter.address_in_footer && !letter.company_address.is_empty() {
        let lines: Vec<String> = letter
            .company_address
            .iter()
            .map(|line| format!("#\"{}\"", escape_typst_string(line)))
            .collect();
        out.push_str(&format!("    #align(center)[{}]\n", lines.join(" \\ ")));
    }
    out.push_str("    #align(right)[#\"Página \"#counter(page).display()]\n  ],\n)\n");
    out.push_str("#set text(lang: \"es\", size: 11pt)\n#set par(leading: 0.75em)\n\n");

    for block in blocks {
        match block {
            Block::Spacer(points) => out.push_str(&format!("#v({points}pt)\n")),
            Block::Paragraph { style, spans } => push_paragraph(&mut out, *style, spans),
            Block::Signature(Some(file_name)) => out.push_str(&format!(
                "#block(below: 6pt)[#image(\"{}\", width: 2in)]\n",
                escape_typst_string(file_name)
            )),
            Block::Signature(None) => {
                push_paragraph(&mut out, Style::Signature, &[Span::Plain(SIGNATURE_RULE.into())])
            }
        }
    }

    out
}

fn push_paragraph(out: &mut String, style: Style, spans: &[Span]) {
    let spec = style.spec();
    let content: String = spans
        .iter()
        .map(|span| match span {
            Span::Plain(text) => format!("#\"{}\"", escape_typst_string(text)),
            Span::Bold(text) => format!("#strong[#\"{}\"]", escape_typst_string(text)),
        })
        .collect();

    out.push_str(&format!(
        "#block(width: 100%, below: {}pt)[\n  #set align({})\n  #set par(justify: {})\n  #set text(size: {}pt, weight: \"{}\")\n  #pad(left: {}in)[{}]\n]\n",
        spec.space_after_pt,
        spec.align,
        spec.justify,
        spec.size_pt,
        if spec.bold { "bold" } else { "regular" },
        spec.indent_in,
        content
    ));
}

/// PNG or JPEG, judged by magic bytes.
fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else {
        None
    }
}

/// Read the signature image, or log why the underscore rule will be used.
pub fn load_signature(path: &Path) -> Option<RenderAsset> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Signature image {} unavailable: {}", path.display(), e);
            return None;
        }
    };

    match image_extension(&bytes) {
        Some(ext) => Some(RenderAsset {
            file_name: format!("{SIGNATURE_ASSET_STEM}.{ext}"),
            bytes,
        }),
        None => {
            log::warn!("Signature image {} is not a PNG or JPEG", path.display());
            None
        }
    }
}

/// Generator for employment certificates.
pub struct CertificateGenerator {
    letter: LetterSettings,
    engine: Box<dyn RenderEngine>,
}

impl CertificateGenerator {
    pub fn new(letter: LetterSettings, engine: impl RenderEngine + 'static) -> Self {
        Self {
            letter,
            engine: Box::new(engine),
        }
    }

    /// Typst source for one narrative, without compiling it.
    pub fn render_source(&self, data: &NarrativeData, signature: Option<&str>) -> String {
        to_typst(&compose(data, &self.letter, signature), &self.letter)
    }
}

impl Generator<NarrativeData> for CertificateGenerator {
    fn generate(&self, request: NarrativeData) -> Result<RenderedDocument, GeneratorError> {
        let signature = self.letter.signature_path.as_deref().and_then(load_signature);

        let pdf = match &signature {
            Some(asset) => {
                let source = self.render_source(&request, Some(&asset.file_name));
                match self.engine.render(&source, std::slice::from_ref(asset)) {
                    Err(GeneratorError::TypstExit(code)) => {
                        log::warn!(
                            "Rendering with signature failed (status {}), retrying with signature line",
                            code
                        );
                        self.engine.render(&self.render_source(&request, None), &[])?
                    }
                    other => other?,
                }
            }
            None => self.engine.render(&self.render_source(&request, None), &[])?,
        };

        Ok(RenderedDocument {
            filename: certificate_filename(
                &request.employee_name,
                &request.employer_name,
                &request.national_id,
            ),
            pdf,
        })
    }
}
