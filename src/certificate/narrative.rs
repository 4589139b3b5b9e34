//! Narrative derivation for one employer's certificate.
//!
//! Turns a [`ContractGroup`] into the sentences and flags the document needs.
//! The group's last record, in source order, is treated as the most recent
//! contract. Records are never re-sorted by date here.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::common::{amount_to_words, format_date, month_name, with_currency_prefix};
use super::employer::{EmployerDirectory, TAX_ID_NOT_FOUND};
use super::grouping::ContractGroup;
use super::numbers::spanish_cardinal;

pub const DEFAULT_CONTRACT_TYPE: &str = "Obra o Labor";
pub const PROGRAM_CLAUSE: &str = "en el programa de alimentación escolar PAE.";
pub const DEFAULT_PROGRAM_TITLES: [&str; 4] = [
    "SUPERVISOR PROGRAMA",
    "MANIPULADORA ALIMENTOS",
    "COORDINADOR DE PROGRAMA",
    "MANIPULADORA",
];

/// How a finished contract is worded in the period list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedPeriodStyle {
    /// "Desde el X hasta el Y, desempeñando el cargo de Z."
    #[default]
    WithRole,
    /// "Desde el X hasta el Y."
    DatesOnly,
}

/// Clause closing the contract sentence for titles outside the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployerClause {
    /// A bare "."
    #[default]
    Terminator,
    /// "con <employer>."
    EmployerName,
}

impl FromStr for ClosedPeriodStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "with_role" => Ok(Self::WithRole),
            "dates_only" => Ok(Self::DatesOnly),
            other => Err(format!("unknown closed period style '{other}'")),
        }
    }
}

impl FromStr for EmployerClause {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "terminator" => Ok(Self::Terminator),
            "employer_name" => Ok(Self::EmployerName),
            other => Err(format!("unknown employer clause '{other}'")),
        }
    }
}

/// Wording rules that vary between deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativePolicy {
    pub closed_period_style: ClosedPeriodStyle,
    pub employer_clause: EmployerClause,
    /// Job titles that get [`PROGRAM_CLAUSE`] whatever the contract status.
    pub program_titles: Vec<String>,
    /// Canonical employers printed on pre-printed letterhead.
    pub letterhead_employers: Vec<String>,
}

impl Default for NarrativePolicy {
    fn default() -> Self {
        Self {
            closed_period_style: ClosedPeriodStyle::default(),
            employer_clause: EmployerClause::default(),
            program_titles: DEFAULT_PROGRAM_TITLES.iter().map(|t| t.to_string()).collect(),
            letterhead_employers: Vec::new(),
        }
    }
}

/// The contract that is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivePeriod {
    /// Already formatted for display.
    pub entry_date: String,
    pub job_title: String,
}

/// Everything the renderer needs for one employer's certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeData {
    pub employee_name: String,
    pub national_id: String,
    pub closed_periods: Vec<String>,
    pub active_period: Option<ActivePeriod>,
    pub latest_title: String,
    pub active: bool,
    /// Empty unless the latest contract is active.
    pub salary_display: String,
    pub salary_words: String,
    pub context_clause: String,
    pub employer_name: String,
    pub employer_tax_id: String,
    pub extra_top_margin: bool,
    pub contract_type: String,
    pub day_words: String,
    pub day_number: String,
    pub month: String,
    pub year: String,
}

/// Per-request parameters shared by every group.
#[derive(Debug, Clone, Copy)]
pub struct IssueContext<'a> {
    pub national_id: &'a str,
    pub contract_type: &'a str,
    pub salary_override: Option<&'a str>,
    pub today: NaiveDate,
}

pub struct NarrativeBuilder<'a> {
    policy: &'a NarrativePolicy,
    directory: &'a EmployerDirectory,
}

impl<'a> NarrativeBuilder<'a> {
    pub fn new(policy: &'a NarrativePolicy, directory: &'a EmployerDirectory) -> Self {
        Self { policy, directory }
    }

    /// Derive the narrative for one group. Returns `None` for an empty group.
    pub fn build(&self, group: &ContractGroup, ctx: &IssueContext<'_>) -> Option<NarrativeData> {
        let first = group.records.first()?;
        let latest = group.records.last()?;

        let mut closed_periods: Vec<String> = Vec::new();
        let mut active_period = None;
        for record in &group.records {
            if record.is_active() {
                if active_period.is_some() {
                    log::warn!(
                        "More than one open contract for {} at '{}', keeping the last",
                        ctx.national_id,
                        group.employer
                    );
                }
                active_period = Some(ActivePeriod {
                    entry_date: format_date(&record.entry_date),
                    job_title: record.job_title.clone(),
                });
                continue;
            }

            let period = self.closed_period_text(
                &format_date(&record.entry_date),
                &format_date(&record.exit_date),
                &record.job_title,
            );
            if !closed_periods.contains(&period) {
                closed_periods.push(period);
            }
        }

        let active = latest.is_active();
        let (salary_display, salary_words) = if active {
            let salary = ctx
                .salary_override
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .or_else(|| latest.base_salary.as_deref().map(str::trim))
                .unwrap_or_default();
            if salary.is_empty() {
                (String::new(), String::new())
            } else {
                let display = with_currency_prefix(salary);
                let words = amount_to_words(&display);
                (display, words)
            }
        } else {
            (String::new(), String::new())
        };

        let contract_type = match ctx.contract_type.trim() {
            "" => DEFAULT_CONTRACT_TYPE.to_string(),
            value => value.to_string(),
        };

        Some(NarrativeData {
            employee_name: first.employee_name.clone(),
            national_id: ctx.national_id.to_string(),
            closed_periods,
            active_period,
            latest_title: latest.job_title.clone(),
            active,
            salary_display,
            salary_words,
            context_clause: self.context_clause(&latest.job_title, &group.employer),
            employer_name: group.employer.clone(),
            employer_tax_id: self.tax_id_for(group),
            extra_top_margin: self
                .policy
                .letterhead_employers
                .iter()
                .any(|name| *name == group.employer),
            contract_type,
            day_words: spanish_cardinal(u64::from(ctx.today.day())),
            day_number: ctx.today.day().to_string(),
            month: month_name(ctx.today.month()).to_string(),
            year: ctx.today.year().to_string(),
        })
    }

    fn closed_period_text(&self, entry: &str, exit: &str, job_title: &str) -> String {
        match self.policy.closed_period_style {
            ClosedPeriodStyle::WithRole => {
                format!("Desde el {entry} hasta el {exit}, desempeñando el cargo de {job_title}.")
            }
            ClosedPeriodStyle::DatesOnly => format!("Desde el {entry} hasta el {exit}."),
        }
    }

    fn context_clause(&self, latest_title: &str, employer: &str) -> String {
        if self.policy.program_titles.iter().any(|t| t == latest_title) {
            return PROGRAM_CLAUSE.to_string();
        }
        match self.policy.employer_clause {
            EmployerClause::Terminator => ".".to_string(),
            EmployerClause::EmployerName => format!("con {employer}."),
        }
    }

    /// The canonical name normally resolves; when the group was keyed by an
    /// unknown spelling, any record that does resolve supplies the tax ID.
    fn tax_id_for(&self, group: &ContractGroup) -> String {
        if let Some(identity) = self.directory.resolve(&group.employer) {
            return identity.tax_id.clone();
        }
        group
            .records
            .iter()
            .find_map(|r| self.directory.resolve(&r.employer_name))
            .map(|identity| identity.tax_id.clone())
            .unwrap_or_else(|| TAX_ID_NOT_FOUND.to_string())
    }
}

/// Title and status of the record with the latest entry date.
///
/// Used by the verification endpoint; unlike [`NarrativeBuilder`] this one
/// does sort, by raw entry date descending.
pub fn latest_position(records: &[super::models::EmploymentRecord]) -> Option<(String, bool)> {
    records
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.entry_date.cmp(&b.entry_date).then(ib.cmp(ia)))
        .map(|(_, r)| (r.job_title.clone(), r.is_active()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::models::{EmployerReferenceRow, EmploymentRecord};

    fn record(title: &str, entry: &str, exit: &str, salary: Option<&str>) -> EmploymentRecord {
        EmploymentRecord {
            national_id: "1144".into(),
            employee_name: "Ana Ruiz".into(),
            employer_name: "SERVIVALLE".into(),
            job_title: title.into(),
            entry_date: entry.into(),
            exit_date: exit.into(),
            base_salary: salary.map(str::to_string),
        }
    }

    fn directory() -> EmployerDirectory {
        let rows = vec![EmployerReferenceRow {
            alias_list: Some("SERVICIOS DEL VALLE S.A.S, SERVIVALLE".into()),
            tax_id: Some("900.123.456-7".into()),
        }];
        EmployerDirectory::from_reference_rows(&rows)
    }

    fn ctx(salary_override: Option<&str>) -> IssueContext<'_> {
        IssueContext {
            national_id: "1144",
            contract_type: "Término Fijo",
            salary_override,
            today: NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(),
        }
    }

    fn group(records: Vec<EmploymentRecord>) -> ContractGroup {
        ContractGroup {
            employer: "SERVICIOS DEL VALLE S.A.S".into(),
            records,
        }
    }

    #[test]
    fn test_closed_and_active_periods() {
        let policy = NarrativePolicy::default();
        let directory = directory();
        let builder = NarrativeBuilder::new(&policy, &directory);

        let data = builder
            .build(
                &group(vec![
                    record("Auxiliar", "20200101", "20211231", None),
                    record("Supervisor", "20220101", "", Some("2400000")),
                ]),
                &ctx(None),
            )
            .unwrap();

        assert_eq!(
            data.closed_periods,
            vec!["Desde el 1 de enero de 2020 hasta el 31 de diciembre de 2021, desempeñando el cargo de Auxiliar."]
        );
        assert_eq!(
            data.active_period,
            Some(ActivePeriod {
                entry_date: "1 de enero de 2022".into(),
                job_title: "Supervisor".into()
            })
        );
        assert!(data.active);
        assert_eq!(data.latest_title, "Supervisor");
        assert_eq!(data.salary_display, "$2400000");
        assert_eq!(data.salary_words, "Dos millones cuatrocientos mil pesos");
        assert_eq!(data.employer_tax_id, "900.123.456-7");
        assert_eq!(data.context_clause, ".");
        assert_eq!(data.day_words, "veintiuno");
        assert_eq!(data.month, "marzo");
    }

    #[test]
    fn test_duplicate_closed_periods_collapse() {
        let policy = NarrativePolicy {
            closed_period_style: ClosedPeriodStyle::DatesOnly,
            ..NarrativePolicy::default()
        };
        let directory = directory();
        let builder = NarrativeBuilder::new(&policy, &directory);

        let data = builder
            .build(
                &group(vec![
                    record("Auxiliar", "20200101", "20201231", None),
                    record("Operario", "20200101", "20201231", None),
                ]),
                &ctx(None),
            )
            .unwrap();

        assert_eq!(
            data.closed_periods,
            vec!["Desde el 1 de enero de 2020 hasta el 31 de diciembre de 2020."]
        );
        assert!(!data.active);
        assert!(data.active_period.is_none());
    }

    #[test]
    fn test_latest_record_is_last_in_source_order() {
        let policy = NarrativePolicy::default();
        let directory = directory();
        let builder = NarrativeBuilder::new(&policy, &directory);

        // The open contract is listed first; the closed one, listed last, decides status.
        let data = builder
            .build(
                &group(vec![
                    record("Supervisor", "20220101", "", Some("2400000")),
                    record("Auxiliar", "20100101", "20111231", None),
                ]),
                &ctx(Some("3000000")),
            )
            .unwrap();

        assert_eq!(data.latest_title, "Auxiliar");
        assert!(!data.active);
        assert!(data.active_period.is_some());
        assert_eq!(data.salary_display, "");
        assert_eq!(data.salary_words, "");
    }

    #[test]
    fn test_salary_override_wins_and_keeps_prefix() {
        let policy = NarrativePolicy::default();
        let directory = directory();
        let builder = NarrativeBuilder::new(&policy, &directory);

        let data = builder
            .build(
                &group(vec![record("Operario", "20230101", "", Some("1300000"))]),
                &ctx(Some("$1,500,000")),
            )
            .unwrap();

        assert_eq!(data.salary_display, "$1,500,000");
        assert_eq!(data.salary_words, "Un millón quinientos mil pesos");
    }

    #[test]
    fn test_program_clause_ignores_status() {
        let policy = NarrativePolicy {
            employer_clause: EmployerClause::EmployerName,
            ..NarrativePolicy::default()
        };
        let directory = directory();
        let builder = NarrativeBuilder::new(&policy, &directory);

        let closed = builder
            .build(
                &group(vec![record("MANIPULADORA", "20200101", "20201231", None)]),
                &ctx(None),
            )
            .unwrap();
        assert_eq!(closed.context_clause, PROGRAM_CLAUSE);

        let other = builder
            .build(
                &group(vec![record("Auxiliar", "20200101", "20201231", None)]),
                &ctx(None),
            )
            .unwrap();
        assert_eq!(other.context_clause, "con SERVICIOS DEL VALLE S.A.S.");
    }

    #[test]
    fn test_unresolved_group_tax_id_and_letterhead() {
        let policy = NarrativePolicy {
            letterhead_employers: vec!["Tienda Local".into()],
            ..NarrativePolicy::default()
        };
        let directory = directory();
        let builder = NarrativeBuilder::new(&policy, &directory);

        let mut unknown = record("Cajero", "20200101", "20201231", None);
        unknown.employer_name = "Tienda Local".into();
        let data = builder
            .build(
                &ContractGroup {
                    employer: "Tienda Local".into(),
                    records: vec![unknown],
                },
                &ctx(None),
            )
            .unwrap();

        assert_eq!(data.employer_tax_id, TAX_ID_NOT_FOUND);
        assert!(data.extra_top_margin);
        assert_eq!(data.contract_type, "Término Fijo");
    }

    #[test]
    fn test_blank_contract_type_uses_default() {
        let policy = NarrativePolicy::default();
        let directory = directory();
        let builder = NarrativeBuilder::new(&policy, &directory);
        let mut context = ctx(None);
        context.contract_type = "  ";

        let data = builder
            .build(&group(vec![record("Auxiliar", "20200101", "", None)]), &context)
            .unwrap();
        assert_eq!(data.contract_type, DEFAULT_CONTRACT_TYPE);
        assert_eq!(data.salary_display, "");
    }

    #[test]
    fn test_latest_position_sorts_by_entry_date() {
        let records = vec![
            record("Supervisor", "20220101", "", None),
            record("Auxiliar", "20100101", "20111231", None),
        ];
        assert_eq!(latest_position(&records), Some(("Supervisor".into(), true)));
        assert_eq!(latest_position(&[]), None);
    }
}
