//! Input validation for certificate requests.
//!
//! Messages are in Spanish since they end up on the form page.

use std::fmt;

use super::models::{IssueRequest, VerifyRequest};
use super::traits::Validator;

/// Validation error with a user-facing message.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} no puede estar vacío", label))
            .with_suggestion(format!("Ingrese {}", label.to_lowercase()))
    }

    pub fn invalid_national_id(field: &str) -> Self {
        Self::new(field, "La cédula debe contener letras o números")
            .with_suggestion("Escriba la cédula tal como aparece en el registro, por ejemplo: 1144123456")
    }

    pub fn invalid_amount(field: &str, value: &str) -> Self {
        Self::new(field, format!("El salario '{}' no contiene un valor", value))
            .with_suggestion("Use un valor como $1.300.000 o deje el campo vacío")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn to_message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Ok if no errors, Err with the joined messages otherwise
    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_message())
        }
    }
}

/// Lookup key for an ID. Stored IDs keep whatever separators they were
/// typed with ("1.144.123.456", "PE123456"), so only the edges are trimmed.
pub fn normalize_national_id(value: &str) -> String {
    value.trim().to_string()
}

pub fn validate_national_id(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, "La cédula"));
        return;
    }

    if !trimmed.chars().any(char::is_alphanumeric) {
        errors.add(ValidationError::invalid_national_id(field));
    }
}

/// Salary override is optional, but when given it must hold some digits.
pub fn validate_amount_optional(value: Option<&str>, field: &str, errors: &mut ValidationErrors) {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return;
    };

    if !value.chars().any(|c| c.is_ascii_digit()) {
        errors.add(ValidationError::invalid_amount(field, value));
    }
}

impl Validator for VerifyRequest {
    fn validate(&self) -> Result<(), String> {
        let mut errors = ValidationErrors::new();
        validate_national_id(&self.national_id, "national_id", &mut errors);
        errors.into_result()
    }
}

impl Validator for IssueRequest {
    fn validate(&self) -> Result<(), String> {
        let mut errors = ValidationErrors::new();
        validate_national_id(&self.national_id, "national_id", &mut errors);
        validate_amount_optional(
            self.salary_override.as_deref(),
            "salary_override",
            &mut errors,
        );
        errors.into_result()
    }
}
