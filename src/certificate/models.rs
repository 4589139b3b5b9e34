use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employment row for an individual, as read from the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRecord {
    pub national_id: String,
    pub employee_name: String,
    pub employer_name: String,
    pub job_title: String,
    /// `YYYYMMDD`, possibly empty.
    pub entry_date: String,
    /// `YYYYMMDD`; empty while the contract is still running.
    pub exit_date: String,
    pub base_salary: Option<String>,
}

impl EmploymentRecord {
    pub fn is_active(&self) -> bool {
        self.exit_date.trim().is_empty()
    }
}

/// Row of the employer reference table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerReferenceRow {
    /// Comma separated aliases, the first one is the canonical name.
    pub alias_list: Option<String>,
    pub tax_id: Option<String>,
}

/// Form submitted to check an ID before generating certificates.
#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct VerifyRequest {
    pub national_id: String,
}

/// Form submitted to generate every certificate for one ID.
#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct IssueRequest {
    pub national_id: String,
    /// Replaces the stored base salary for active contracts.
    #[serde(default)]
    pub salary_override: Option<String>,
    /// Blank falls back to "Obra o Labor".
    #[serde(default)]
    pub contract_type: String,
}

/// Latest position of an individual across every employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationSummary {
    pub latest_title: String,
    pub active: bool,
}

/// Result of generating and uploading one employer's certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IssueOutcome {
    pub employer: String,
    pub filename: String,
    pub link: Option<String>,
    pub error: Option<String>,
}

impl IssueOutcome {
    pub fn succeeded(employer: String, filename: String, link: String) -> Self {
        Self {
            employer,
            filename,
            link: Some(link),
            error: None,
        }
    }

    pub fn failed(employer: String, filename: String, error: impl ToString) -> Self {
        Self {
            employer,
            filename,
            link: None,
            error: Some(format!("Error: {}", error.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        self.link.is_some()
    }
}

/// Outcomes for every employer attempted in one request, in group order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IssueReport {
    pub outcomes: Vec<IssueOutcome>,
}

impl IssueReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_request_deserialization_without_override() {
        let json = r#"{
            "national_id": "1144000111",
            "contract_type": "Obra o Labor"
        }"#;

        let request: IssueRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.national_id, "1144000111");
        assert_eq!(request.salary_override, None);
    }

    #[test]
    fn test_report_success_count() {
        let report = IssueReport {
            outcomes: vec![
                IssueOutcome::succeeded("A".into(), "a.pdf".into(), "https://x/a".into()),
                IssueOutcome::failed("B".into(), "b.pdf".into(), "upload rejected"),
            ],
        };

        assert_eq!(report.success_count(), 1);
        assert_eq!(
            report.outcomes[1].error.as_deref(),
            Some("Error: upload rejected")
        );
    }
}
