//! Vaccine types, operations and supplier permissions
//!
//! Permissions are strings of the form `{VACCINE_TYPE}_{FULL|CREATE|UPDATE|DELETE}`
//! held per supplier in the permission cache. `{VACCINE_TYPE}_FULL` grants all
//! three operations for that vaccine type.

use crate::domain::rejection::{FileRejection, FileRejectionKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// SNOMED CT coding system URI
pub const SNOMED_SYSTEM: &str = "http://snomed.info/sct";

/// Vaccine types accepted in file keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VaccineType {
    Covid19,
    Flu,
    Mmr,
    Rsv,
}

impl VaccineType {
    /// The canonical upper-case name used in file keys and permissions
    pub fn as_str(&self) -> &'static str {
        match self {
            VaccineType::Covid19 => "COVID19",
            VaccineType::Flu => "FLU",
            VaccineType::Mmr => "MMR",
            VaccineType::Rsv => "RSV",
        }
    }

    /// All accepted vaccine types
    pub fn all() -> &'static [VaccineType] {
        &[
            VaccineType::Covid19,
            VaccineType::Flu,
            VaccineType::Mmr,
            VaccineType::Rsv,
        ]
    }
}

impl fmt::Display for VaccineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VaccineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "COVID19" => Ok(VaccineType::Covid19),
            "FLU" => Ok(VaccineType::Flu),
            "MMR" => Ok(VaccineType::Mmr),
            "RSV" => Ok(VaccineType::Rsv),
            other => Err(format!("Unknown vaccine type: {other}")),
        }
    }
}

/// The operation a row requests against the record store
///
/// The source file carries this as the ACTION_FLAG column (NEW/UPDATE/DELETE);
/// NEW maps to `Create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    /// The canonical operation name used in permissions and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }

    /// Parse an ACTION_FLAG column value, case-insensitively
    ///
    /// Returns `None` for anything other than NEW, UPDATE or DELETE.
    pub fn from_action_flag(flag: &str) -> Option<Self> {
        match flag.trim().to_uppercase().as_str() {
            "NEW" => Some(Operation::Create),
            "UPDATE" => Some(Operation::Update),
            "DELETE" => Some(Operation::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse admission-time check: does the supplier hold any permission at all
/// for this vaccine type?
///
/// Fine-grained per-operation checking is deferred to row processing.
pub fn has_any_vaccine_permission(vaccine_type: VaccineType, permissions: &[String]) -> bool {
    let prefix = format!("{}_", vaccine_type.as_str());
    permissions.iter().any(|p| p.starts_with(&prefix))
}

/// Determine the set of operations the supplier may perform for this file
///
/// `{VACCINE}_FULL` grants all three operations without reading the file.
/// Otherwise the distinct operations the file actually requests are
/// intersected with the supplier's itemized permissions; an empty
/// intersection rejects the whole file with `NoOperationPermission`.
pub fn permitted_operations(
    supplier: &str,
    vaccine_type: VaccineType,
    permissions: &[String],
    requested: &HashSet<Operation>,
) -> Result<HashSet<Operation>, FileRejection> {
    let full = format!("{}_FULL", vaccine_type.as_str());
    if permissions.iter().any(|p| p == &full) {
        return Ok([Operation::Create, Operation::Update, Operation::Delete]
            .into_iter()
            .collect());
    }

    let itemized: HashSet<Operation> = permissions
        .iter()
        .filter_map(|p| {
            let rest = p.strip_prefix(&format!("{}_", vaccine_type.as_str()))?;
            match rest {
                "CREATE" => Some(Operation::Create),
                "UPDATE" => Some(Operation::Update),
                "DELETE" => Some(Operation::Delete),
                _ => None,
            }
        })
        .collect();

    if itemized.is_disjoint(requested) {
        return Err(FileRejection::new(
            FileRejectionKind::NoOperationPermission,
            format!("{supplier} does not have permissions to perform any of the requested actions."),
        ));
    }

    Ok(itemized)
}

/// A coded target disease attached to a canonical record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseCoding {
    /// Coding system URI
    pub system: String,
    /// Disease code within the system
    pub code: String,
    /// Display term corresponding to the code
    pub display: String,
}

impl DiseaseCoding {
    fn snomed(code: &str, display: &str) -> Self {
        Self {
            system: SNOMED_SYSTEM.to_string(),
            code: code.to_string(),
            display: display.to_string(),
        }
    }
}

/// Returns the target disease codings for a vaccine type
///
/// MMR maps to three diseases; every other vaccine type maps to one.
pub fn target_diseases(vaccine_type: VaccineType) -> Vec<DiseaseCoding> {
    match vaccine_type {
        VaccineType::Covid19 => vec![DiseaseCoding::snomed(
            "840539006",
            "Disease caused by severe acute respiratory syndrome coronavirus 2",
        )],
        VaccineType::Flu => vec![DiseaseCoding::snomed("6142004", "Influenza")],
        VaccineType::Mmr => vec![
            DiseaseCoding::snomed("14189004", "Measles"),
            DiseaseCoding::snomed("36989005", "Mumps"),
            DiseaseCoding::snomed("36653000", "Rubella"),
        ],
        VaccineType::Rsv => vec![DiseaseCoding::snomed(
            "55735004",
            "Respiratory syncytial virus infection (disorder)",
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_action_flag_parsing_is_case_insensitive() {
        assert_eq!(Operation::from_action_flag("new"), Some(Operation::Create));
        assert_eq!(Operation::from_action_flag("Update"), Some(Operation::Update));
        assert_eq!(Operation::from_action_flag("DELETE"), Some(Operation::Delete));
        assert_eq!(Operation::from_action_flag("CREATE"), None);
        assert_eq!(Operation::from_action_flag(""), None);
    }

    #[test]
    fn test_coarse_vaccine_permission_check() {
        let permissions = perms(&["FLU_FULL", "RSV_CREATE"]);
        assert!(has_any_vaccine_permission(VaccineType::Flu, &permissions));
        assert!(has_any_vaccine_permission(VaccineType::Rsv, &permissions));
        assert!(!has_any_vaccine_permission(VaccineType::Covid19, &permissions));
    }

    #[test]
    fn test_full_permission_grants_all_operations() {
        let requested = [Operation::Create].into_iter().collect();
        let allowed = permitted_operations(
            "EMIS",
            VaccineType::Flu,
            &perms(&["FLU_FULL"]),
            &requested,
        )
        .unwrap();
        assert_eq!(allowed.len(), 3);
    }

    #[test]
    fn test_itemized_permissions_intersect_with_requested() {
        let requested = [Operation::Create, Operation::Delete].into_iter().collect();
        let allowed = permitted_operations(
            "RAVS",
            VaccineType::Rsv,
            &perms(&["RSV_CREATE", "RSV_UPDATE", "FLU_FULL"]),
            &requested,
        )
        .unwrap();
        // The permitted set is the supplier's itemized grants for the vaccine
        // type, not the intersection: per-row checks enforce the rest.
        assert!(allowed.contains(&Operation::Create));
        assert!(allowed.contains(&Operation::Update));
        assert!(!allowed.contains(&Operation::Delete));
    }

    #[test]
    fn test_empty_intersection_rejects_file() {
        let requested = [Operation::Delete].into_iter().collect();
        let rejection = permitted_operations(
            "SONAR",
            VaccineType::Flu,
            &perms(&["FLU_CREATE"]),
            &requested,
        )
        .unwrap_err();
        assert_eq!(rejection.kind, FileRejectionKind::NoOperationPermission);
    }

    #[test]
    fn test_mmr_maps_to_three_diseases() {
        let diseases = target_diseases(VaccineType::Mmr);
        assert_eq!(diseases.len(), 3);
        assert!(diseases.iter().all(|d| d.system == SNOMED_SYSTEM));
    }
}
