//! Contract grouping - one person's records partitioned by canonical employer.

use std::collections::HashMap;

use super::employer::EmployerDirectory;
use super::models::EmploymentRecord;

/// All of one individual's records attributed to one canonical employer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractGroup {
    pub employer: String,
    pub records: Vec<EmploymentRecord>,
}

/// Partition records by canonical employer.
///
/// Groups come out in order of first appearance and keep the input order of
/// their records. A name missing from the directory keys its own group, so two
/// unknown spellings of the same company stay apart.
pub fn group_by_employer(
    records: Vec<EmploymentRecord>,
    directory: &EmployerDirectory,
) -> Vec<ContractGroup> {
    let mut groups: Vec<ContractGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = directory.resolve_or_self(&record.employer_name).canonical_name;

        match index.get(&key) {
            Some(&position) => groups[position].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ContractGroup {
                    employer: key,
                    records: vec![record],
                });
            }
        }
    }

    groups
}
