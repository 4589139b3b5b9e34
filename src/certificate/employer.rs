//! Employer identity resolution.
//!
//! The reference table lists each employer once with every known spelling of
//! its name. The first spelling is the official one and carries the tax ID.

use std::collections::HashMap;

use super::models::EmployerReferenceRow;

pub const TAX_ID_NOT_FOUND: &str = "NIT no encontrado";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployerIdentity {
    pub canonical_name: String,
    pub tax_id: String,
}

/// Alias lookup built once per request from the reference table.
#[derive(Debug, Clone, Default)]
pub struct EmployerDirectory {
    by_alias: HashMap<String, EmployerIdentity>,
}

impl EmployerDirectory {
    /// Build the lookup. Rows without aliases or tax ID are skipped; when two
    /// rows claim the same alias the later row wins.
    pub fn from_reference_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a EmployerReferenceRow>,
    {
        let mut by_alias = HashMap::new();

        for row in rows {
            let (Some(alias_list), Some(tax_id)) = (row.alias_list.as_deref(), row.tax_id.as_deref())
            else {
                continue;
            };
            let tax_id = tax_id.trim();
            if alias_list.trim().is_empty() || tax_id.is_empty() {
                continue;
            }

            let aliases: Vec<&str> = alias_list
                .split(',')
                .map(str::trim)
                .filter(|alias| !alias.is_empty())
                .collect();
            let Some(canonical) = aliases.first() else {
                continue;
            };

            let identity = EmployerIdentity {
                canonical_name: canonical.to_string(),
                tax_id: tax_id.to_string(),
            };
            for alias in &aliases {
                if let Some(previous) = by_alias.insert(alias.to_string(), identity.clone()) {
                    if previous != identity {
                        log::debug!(
                            "Alias '{}' moved from '{}' to '{}'",
                            alias,
                            previous.canonical_name,
                            identity.canonical_name
                        );
                    }
                }
            }
        }

        Self { by_alias }
    }

    pub fn resolve(&self, raw_name: &str) -> Option<&EmployerIdentity> {
        self.by_alias.get(raw_name.trim())
    }

    /// Resolve, or treat the raw name as its own canonical employer.
    pub fn resolve_or_self(&self, raw_name: &str) -> EmployerIdentity {
        self.resolve(raw_name)
            .cloned()
            .unwrap_or_else(|| EmployerIdentity {
                canonical_name: raw_name.to_string(),
                tax_id: TAX_ID_NOT_FOUND.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}
