//! Settings read from the environment (and `.env` through dotenvy).

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::certificate::common::get_static_dir;
use crate::certificate::narrative::{ClosedPeriodStyle, EmployerClause, NarrativePolicy};
use crate::certificate::LetterSettings;
use crate::storage::SupabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub supabase: SupabaseConfig,
    pub typst_bin: String,
    pub policy: NarrativePolicy,
    pub letter: LetterSettings,
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let defaults = NarrativePolicy::default();
        let policy = NarrativePolicy {
            closed_period_style: match get("CLOSED_PERIOD_STYLE") {
                Some(v) => v.parse::<ClosedPeriodStyle>().map_err(|message| ConfigError::Invalid {
                    name: "CLOSED_PERIOD_STYLE",
                    message,
                })?,
                None => defaults.closed_period_style,
            },
            employer_clause: match get("EMPLOYER_CLAUSE") {
                Some(v) => v.parse::<EmployerClause>().map_err(|message| ConfigError::Invalid {
                    name: "EMPLOYER_CLAUSE",
                    message,
                })?,
                None => defaults.employer_clause,
            },
            program_titles: get("PROGRAM_TITLES")
                .map(|v| split_list(&v, ','))
                .unwrap_or(defaults.program_titles),
            letterhead_employers: get("LETTERHEAD_EMPLOYERS")
                .map(|v| split_list(&v, ','))
                .unwrap_or_default(),
        };

        let letter_defaults = LetterSettings::default();
        let letter = LetterSettings {
            signer_name: or("SIGNER_NAME", &letter_defaults.signer_name),
            signer_department: or("SIGNER_DEPARTMENT", &letter_defaults.signer_department),
            signer_phone: or("SIGNER_PHONE", &letter_defaults.signer_phone),
            issue_city: or("ISSUE_CITY", &letter_defaults.issue_city),
            company_address: get("COMPANY_ADDRESS")
                .map(|v| split_list(&v, '|'))
                .unwrap_or_default(),
            address_in_footer: parse_bool("ADDRESS_IN_FOOTER", get("ADDRESS_IN_FOOTER"))?,
            signature_path: Some(
                get("SIGNATURE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| get_static_dir().join("firma.png")),
            ),
        };

        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                message: format!("'{v}' is not a port number"),
            })?,
            None => 8080,
        };

        Ok(Settings {
            database_url: required("DATABASE_URL")?,
            supabase: SupabaseConfig {
                supabase_url: required("SUPABASE_URL")?,
                supabase_key: required("SUPABASE_SERVICE_KEY")?,
                bucket_name: or("BUCKET_NAME", "certificados"),
                folder: or("STORAGE_FOLDER", "certificados"),
            },
            typst_bin: or("TYPST_BIN", "typst"),
            policy,
            letter,
            host: or("HOST", "0.0.0.0"),
            port,
        })
    }
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no") => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            name,
            message: format!("'{v}' is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/certificados"),
        ("SUPABASE_URL", "https://test.supabase.co"),
        ("SUPABASE_SERVICE_KEY", "key"),
    ];

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.supabase.bucket_name, "certificados");
        assert_eq!(settings.policy, NarrativePolicy::default());
        assert!(settings.policy.letterhead_employers.is_empty());
        assert!(!settings.letter.address_in_footer);
        assert!(settings
            .letter
            .signature_path
            .as_ref()
            .unwrap()
            .ends_with("static/firma.png"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("CLOSED_PERIOD_STYLE", "dates_only"),
            ("EMPLOYER_CLAUSE", "employer_name"),
            ("LETTERHEAD_EMPLOYERS", "CORPORACION HACIA UN VALLE SOLIDARIO, OTRA"),
            ("COMPANY_ADDRESS", "Calle 15 # 26-101 | YUMBO-VALLE"),
            ("ADDRESS_IN_FOOTER", "true"),
            ("PORT", "9000"),
        ]);
        let settings = Settings::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(settings.policy.closed_period_style, ClosedPeriodStyle::DatesOnly);
        assert_eq!(settings.policy.employer_clause, EmployerClause::EmployerName);
        assert_eq!(
            settings.policy.letterhead_employers,
            vec!["CORPORACION HACIA UN VALLE SOLIDARIO", "OTRA"]
        );
        assert_eq!(settings.letter.company_address, vec!["Calle 15 # 26-101", "YUMBO-VALLE"]);
        assert!(settings.letter.address_in_footer);
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn test_missing_and_invalid() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EMPLOYER_CLAUSE", "sometimes"));
        let err = Settings::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "EMPLOYER_CLAUSE", .. }));
    }
}
