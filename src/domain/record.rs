//! Canonical clinical record model
//!
//! One [`CanonicalRecord`] is derived from each valid CSV row. The record
//! carries a system-scoped identifier pair that must be globally unique among
//! non-deleted records in the store, a patient subject, the vaccination event
//! details, and the coded target diseases for the vaccine type.
//!
//! This is the pipeline's own canonical shape, not a full FHIR resource.

use crate::domain::vaccine::{DiseaseCoding, VaccineType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// System-scoped record identifier pair
///
/// Uniqueness of `(system, value)` among non-deleted records is the one
/// strong-consistency requirement in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordIdentifier {
    /// Owning URI of the identifier
    pub system: String,
    /// Identifier value within the system
    pub value: String,
}

impl RecordIdentifier {
    /// Create a new identifier pair
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for RecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.system, self.value)
    }
}

/// Patient subject of a vaccination record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSubject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nhs_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    /// Date of birth, normalized to `YYYY-MM-DD` where possible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Administrative gender, normalized from the numeric code where recognised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

/// A coded value with an optional display term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedValue {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

impl CodedValue {
    /// Build a coded value from optional code and term columns
    ///
    /// Returns `None` when the code itself is absent; a term without a code
    /// carries no meaning.
    pub fn from_columns(code: Option<&str>, term: Option<&str>) -> Option<Self> {
        let code = code.filter(|c| !c.trim().is_empty())?;
        Some(Self {
            code: code.to_string(),
            term: term
                .filter(|t| !t.trim().is_empty())
                .map(|t| t.to_string()),
        })
    }
}

/// Details of the vaccination event itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaccinationEvent {
    /// When the vaccination occurred, normalized to RFC 3339 where possible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<String>,
    /// When the record was recorded, normalized to `YYYY-MM-DD` where possible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<String>,
    /// Whether the submitting organization observed the event first-hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<CodedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_sequence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<CodedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    /// Vaccine expiry date, normalized to `YYYY-MM-DD` where possible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_of_vaccination: Option<CodedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_of_vaccination: Option<CodedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_unit: Option<CodedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indication_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performing_professional_forename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performing_professional_surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_code_type_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_code_type_uri: Option<String>,
}

/// The canonical clinical record derived from one CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Vaccine type the submitting file was admitted for
    pub vaccine_type: VaccineType,
    /// Globally unique identifier pair for this record
    pub identifier: RecordIdentifier,
    /// Patient subject reference
    pub patient: PatientSubject,
    /// Vaccination event details
    pub event: VaccinationEvent,
    /// Coded target diseases for the vaccine type
    pub target_diseases: Vec<DiseaseCoding>,
}
