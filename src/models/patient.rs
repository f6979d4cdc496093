//! Patient record supplied by the caller for one generation request.
//!
//! The inbound record is loosely typed: any field may be missing, scalars
//! may arrive as strings or numbers, and unrecognised fields are kept so
//! they can still be rendered. Every accessor returns `Option` and the
//! formatters substitute a placeholder for `None`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::pipeline::schedule::parse_clinical_date;

/// Pre-filled treatment and applicant details used when the form leaves them blank.
pub mod defaults {
    pub const DIAGNOSIS: &str = "Morbid obesity";
    pub const SURGICAL_PROCEDURE: &str = "Sleeve gastrectomy";
    pub const HOSPITAL_NAME: &str = "Hôpital de La Tour";
    pub const HOSPITAL_ADDRESS: &str = "Avenue J.-D. Maillard 3, 1217 Meyrin, Switzerland";
    pub const SURGEON_NAME: &str = "Dr Jean-Marie Mégevand";
    pub const HOSPITAL_PHONE: &str = "+41 22 719 63 65";
    pub const HOSPITAL_EMAIL: &str = "direction@latour.ch";
    pub const HOSPITAL_DIRECTOR: &str = "Olivier SCHMITT";
    pub const HOSPITAL_DIRECTOR_TITLE: &str = "Directeur General/CEO";
    pub const APPLICANT_NAME: &str = "Dr Stéphane Bach";
    pub const APPLICANT_TITLE: &str = "Doctor";
    pub const APPLICANT_PHONE: &str = "+447458114333";
    pub const APPLICANT_EMAIL: &str = "sbach@obesity-care-clinic.com";
    pub const APPLICANT_ADDRESS: &str = "Quad Central Q3, Level 1, Office 5 Triq l-Esportaturi \
(Zona Industrijali, Mriehel) Mriehel Industrial Zone CBD 1040 Malta";
}

/// The supplied patient data was absent or not a structured record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Patient data missing or invalid: {0}")]
pub struct InvalidPatientData(pub String);

/// Patient, GP, treatment and applicant details for one application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRecord {
    // Identity
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sex: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub nhs_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub national_insurance: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub postcode: Option<String>,

    // GP
    #[serde(deserialize_with = "lenient_string")]
    pub gp_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gp_practice: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gp_address: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gp_consultation_date: Option<String>,

    // Clinical
    #[serde(deserialize_with = "lenient_string")]
    pub height: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub weight: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub bmi: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub diagnosis: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub comorbidities: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub medications: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub treatment_history: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub surgical_procedure: Option<String>,

    // Treatment and facility
    #[serde(deserialize_with = "lenient_string")]
    pub treatment_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub hospital_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub hospital_address: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub surgeon_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub hospital_phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub hospital_email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub hospital_director: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub hospital_director_title: Option<String>,

    // Applicant (S2 representative)
    #[serde(deserialize_with = "lenient_string")]
    pub applicant_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub applicant_title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub applicant_phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub applicant_email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub applicant_address: Option<String>,

    /// Fields the record carries that have no named slot above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PatientRecord {
    /// Build a record from untyped JSON. Only objects are accepted.
    pub fn from_value(value: &Value) -> Result<Self, InvalidPatientData> {
        if !value.is_object() {
            return Err(InvalidPatientData(format!(
                "expected a JSON object, got {}",
                json_kind(value)
            )));
        }
        serde_json::from_value(value.clone()).map_err(|e| InvalidPatientData(e.to_string()))
    }

    /// Fill blank diagnosis, procedure, facility and applicant fields with the
    /// pre-filled values of the application form.
    pub fn with_defaults(mut self) -> Self {
        fn fill(slot: &mut Option<String>, value: &str) {
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
        fill(&mut self.diagnosis, defaults::DIAGNOSIS);
        fill(&mut self.surgical_procedure, defaults::SURGICAL_PROCEDURE);
        fill(&mut self.hospital_name, defaults::HOSPITAL_NAME);
        fill(&mut self.hospital_address, defaults::HOSPITAL_ADDRESS);
        fill(&mut self.surgeon_name, defaults::SURGEON_NAME);
        fill(&mut self.hospital_phone, defaults::HOSPITAL_PHONE);
        fill(&mut self.hospital_email, defaults::HOSPITAL_EMAIL);
        fill(&mut self.hospital_director, defaults::HOSPITAL_DIRECTOR);
        fill(&mut self.hospital_director_title, defaults::HOSPITAL_DIRECTOR_TITLE);
        fill(&mut self.applicant_name, defaults::APPLICANT_NAME);
        fill(&mut self.applicant_title, defaults::APPLICANT_TITLE);
        fill(&mut self.applicant_phone, defaults::APPLICANT_PHONE);
        fill(&mut self.applicant_email, defaults::APPLICANT_EMAIL);
        fill(&mut self.applicant_address, defaults::APPLICANT_ADDRESS);
        self
    }

    /// `fullName` if given, otherwise first and last name joined.
    pub fn display_name(&self) -> Option<String> {
        if let Some(full) = &self.full_name {
            return Some(full.clone());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    }

    /// BMI as supplied, or derived from height (cm) and weight (kg).
    pub fn bmi(&self) -> Option<String> {
        self.bmi.clone().or_else(|| {
            let height = parse_positive(self.height.as_deref()?)?;
            let weight = parse_positive(self.weight.as_deref()?)?;
            Some(format!("{:.1}", compute_bmi(height, weight)))
        })
    }

    /// Age in whole years on `on`, when the date of birth parses.
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        let dob = parse_clinical_date(self.date_of_birth.as_deref()?)?;
        let mut years = on.year() - dob.year();
        if (on.month(), on.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Identifier used in generation metadata. Never the patient's name.
    pub fn patient_id(&self) -> String {
        self.nhs_number
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Core fields the application form requires before submission.
    pub fn missing_core_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.display_name().is_none() {
            missing.push("fullName");
        }
        if self.date_of_birth.is_none() {
            missing.push("dateOfBirth");
        }
        if self.nhs_number.is_none() {
            missing.push("nhsNumber");
        }
        if self.height.is_none() {
            missing.push("height");
        }
        if self.weight.is_none() {
            missing.push("weight");
        }
        if self.bmi().is_none() {
            missing.push("bmi");
        }
        missing
    }
}

/// BMI from height in centimetres and weight in kilograms.
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Scalar text from any JSON scalar; blank strings and null become `None`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if b { "Yes" } else { "No" }.to_string()),
        Value::Array(items) => {
            let joined = items
                .into_iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        other @ Value::Object(_) => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    };
    Ok(items)
}
