//! Data formatter: renders the fields each document type needs into a
//! labeled plain-text block and substitutes it into the user instruction.
//!
//! Absent fields are written as [`NOT_SPECIFIED`] so the model never sees a
//! dangling label. Substitution is literal text replacement and values are
//! not sanitised; inputs are operator-entered form data.

use chrono::NaiveDate;

use super::dosage::with_standard_dosage;
use super::prompts::{PATIENT_DATA_PLACEHOLDER, TREATMENT_DATE_PLACEHOLDER};
use super::registry::resolve;
use super::schedule::FollowUpSchedule;
use super::GenerationError;
use crate::models::{DocumentType, PatientRecord};

/// Placeholder written for any absent field.
pub const NOT_SPECIFIED: &str = "Not specified";

const NHS_DELAY_STATISTICS: &[&str] = &[
    "NHS bariatric surgery waiting time: 18-34 months depending on region",
    "Bariatric waiting list: more than 8,000 patients (RCS 2024)",
    "No NHS trust currently meets the 18-week referral-to-treatment target",
    "Several trusts have suspended new Tier 3/Tier 4 referrals",
];

const LEGAL_FRAMEWORK: &[&str] = &[
    "Article 20 of Regulation (EC) No 883/2004 (prior authorisation, S2 route)",
    "Regulation (EC) No 987/2009 (implementing regulation)",
    "CJEU: Watts (C-372/04), Smits-Peerbooms (C-157/99), Elchinov (C-173/09), Petru (C-268/13)",
    "NHS England guidance on \"undue delay\" for planned treatment abroad",
];

// ═══════════════════════════════════════════════════════════
// Public entry points
// ═══════════════════════════════════════════════════════════

/// Final user instruction for a document type, dated today when no
/// treatment date is given.
pub fn format(
    document_type_id: &str,
    record: &PatientRecord,
    treatment_date: Option<&str>,
) -> Result<String, GenerationError> {
    let (config, _) = resolve(document_type_id)?;
    Ok(format_for(
        config.id,
        record,
        treatment_date,
        chrono::Utc::now().date_naive(),
    ))
}

/// Deterministic variant of [`format`] with an explicit reference date.
pub fn format_for(
    doc: DocumentType,
    record: &PatientRecord,
    treatment_date: Option<&str>,
    today: NaiveDate,
) -> String {
    let (config, _) = super::registry::resolve_type(doc);
    let date = resolve_treatment_date(treatment_date, record, today);
    let block = format_patient_data(doc, record, &date, today);
    substitute(
        config.user_instruction_template,
        &[
            (PATIENT_DATA_PLACEHOLDER, block.as_str()),
            (TREATMENT_DATE_PLACEHOLDER, date.as_str()),
        ],
    )
}

/// Explicit date if given, then the record's own treatment date, then today.
pub fn resolve_treatment_date(
    explicit: Option<&str>,
    record: &PatientRecord,
    today: NaiveDate,
) -> String {
    explicit
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| record.treatment_date.clone())
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string())
}

/// Labeled data block holding the fields `doc` needs.
pub fn format_patient_data(
    doc: DocumentType,
    record: &PatientRecord,
    treatment_date: &str,
    today: NaiveDate,
) -> String {
    let mut block = DataBlock::default();
    match doc {
        DocumentType::MedicalReport => {
            identity(&mut block, record, today);
            clinical(&mut block, record);
            comorbidities(&mut block, record);
            medications(&mut block, record);
            treatment_history(&mut block, record);
            treatment_plan(&mut block, record, treatment_date);
        }
        DocumentType::UndueDelayLetter => {
            identity(&mut block, record, today);
            clinical(&mut block, record);
            comorbidities(&mut block, record);
            treatment_history(&mut block, record);
            facility(&mut block, record);
            block.lines("NHS DELAY STATISTICS", NHS_DELAY_STATISTICS);
        }
        DocumentType::ProviderDeclaration => {
            identity(&mut block, record, today);
            block.section("DIAGNOSIS AND TREATMENT");
            block.field("Primary diagnosis", record.diagnosis.as_deref());
            block.field("Proposed procedure", record.surgical_procedure.as_deref());
            block.field("Planned treatment date", Some(treatment_date));
            facility(&mut block, record);
        }
        DocumentType::S2ApplicationForm => {
            identity(&mut block, record, today);
            block.field("National Insurance number", record.national_insurance.as_deref());
            gp(&mut block, record);
            clinical(&mut block, record);
            comorbidities(&mut block, record);
            facility(&mut block, record);
            applicant(&mut block, record);
        }
        DocumentType::LegalJustificationLetter => {
            identity(&mut block, record, today);
            clinical(&mut block, record);
            comorbidities(&mut block, record);
            block.lines("LEGAL FRAMEWORK", LEGAL_FRAMEWORK);
            block.lines("NHS DELAY STATISTICS", NHS_DELAY_STATISTICS);
        }
    }
    additional_details(&mut block, record);
    block.finish()
}

/// Replace each placeholder in `template` in a single left-to-right pass.
///
/// Substituted values are never rescanned, so a value that happens to
/// contain a placeholder is emitted verbatim.
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        for (placeholder, value) in values {
            if tail.starts_with(placeholder) {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

// ═══════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════

fn identity(block: &mut DataBlock, record: &PatientRecord, today: NaiveDate) {
    block.section("PATIENT IDENTIFICATION");
    block.field("Full name", record.display_name().as_deref());
    block.field("Date of birth", record.date_of_birth.as_deref());
    block.field(
        "Age",
        record.age_on(today).map(|age| format!("{age} years")).as_deref(),
    );
    block.field("Sex", record.sex.as_deref());
    block.field("NHS number", record.nhs_number.as_deref());
    block.field("Address", joined(&[&record.address, &record.postcode]).as_deref());
    block.field("Contact", joined_with(&[&record.phone, &record.email], " / ").as_deref());
}

fn clinical(block: &mut DataBlock, record: &PatientRecord) {
    block.section("CLINICAL DATA");
    block.field("Height", with_unit(record.height.as_deref(), "cm").as_deref());
    block.field("Weight", with_unit(record.weight.as_deref(), "kg").as_deref());
    block.field("BMI", with_unit(record.bmi().as_deref(), "kg/m²").as_deref());
    block.field("Primary diagnosis", record.diagnosis.as_deref());
}

fn comorbidities(block: &mut DataBlock, record: &PatientRecord) {
    block.list("COMORBIDITIES", &record.comorbidities);
}

fn medications(block: &mut DataBlock, record: &PatientRecord) {
    let enriched: Vec<String> = record
        .medications
        .iter()
        .map(|m| with_standard_dosage(m))
        .collect();
    block.list("CURRENT MEDICATIONS", &enriched);
}

fn treatment_history(block: &mut DataBlock, record: &PatientRecord) {
    block.section("NON-SURGICAL MANAGEMENT HISTORY");
    block.field("Conservative treatment", record.treatment_history.as_deref());
}

fn treatment_plan(block: &mut DataBlock, record: &PatientRecord, treatment_date: &str) {
    block.section("TREATMENT PLAN");
    block.field("Proposed procedure", record.surgical_procedure.as_deref());
    block.field("Receiving hospital", record.hospital_name.as_deref());
    block.field("Hospital address", record.hospital_address.as_deref());
    block.field("Surgeon", record.surgeon_name.as_deref());
    block.field("Planned surgery date", Some(treatment_date));
    match FollowUpSchedule::from_raw(treatment_date) {
        Some(schedule) => {
            for line in schedule.render_lines() {
                block.bullet(&line);
            }
        }
        None => block.field("Follow-up schedule", Some("To be scheduled")),
    }
}

fn facility(block: &mut DataBlock, record: &PatientRecord) {
    block.section("TREATING FACILITY");
    block.field("Hospital", record.hospital_name.as_deref());
    block.field("Address", record.hospital_address.as_deref());
    block.field("Telephone", record.hospital_phone.as_deref());
    block.field("Email", record.hospital_email.as_deref());
    block.field(
        "Director",
        joined_with(&[&record.hospital_director, &record.hospital_director_title], ", ").as_deref(),
    );
    block.field("Surgeon", record.surgeon_name.as_deref());
}

fn gp(block: &mut DataBlock, record: &PatientRecord) {
    block.section("GP DETAILS");
    block.field("GP name", record.gp_name.as_deref());
    block.field("Practice", record.gp_practice.as_deref());
    block.field("Practice address", record.gp_address.as_deref());
    block.field("Last consultation", record.gp_consultation_date.as_deref());
}

fn applicant(block: &mut DataBlock, record: &PatientRecord) {
    block.section("APPLICANT (REPRESENTATIVE)");
    block.field("Name", record.applicant_name.as_deref());
    block.field("Title", record.applicant_title.as_deref());
    block.field("Telephone", record.applicant_phone.as_deref());
    block.field("Email", record.applicant_email.as_deref());
    block.field("Address", record.applicant_address.as_deref());
}

fn additional_details(block: &mut DataBlock, record: &PatientRecord) {
    let details: Vec<(String, String)> = record
        .extra
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) if s.trim().is_empty() => return None,
                serde_json::Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect();
    if details.is_empty() {
        return;
    }
    block.section("ADDITIONAL DETAILS");
    for (key, text) in &details {
        block.field(key, Some(text));
    }
}

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

/// Accumulates labeled sections of plain text.
#[derive(Default)]
struct DataBlock {
    out: String,
}

impl DataBlock {
    fn section(&mut self, title: &str) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(title);
        self.out.push('\n');
    }

    fn field(&mut self, label: &str, value: Option<&str>) {
        self.out.push_str("- ");
        self.out.push_str(label);
        self.out.push_str(": ");
        self.out.push_str(value.unwrap_or(NOT_SPECIFIED));
        self.out.push('\n');
    }

    fn bullet(&mut self, text: &str) {
        self.out.push_str("  - ");
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn list(&mut self, title: &str, items: &[String]) {
        self.section(title);
        if items.is_empty() {
            self.out.push_str("- ");
            self.out.push_str(NOT_SPECIFIED);
            self.out.push('\n');
        }
        for item in items {
            self.out.push_str("- ");
            self.out.push_str(item);
            self.out.push('\n');
        }
    }

    fn lines(&mut self, title: &str, lines: &[&str]) {
        self.section(title);
        for line in lines {
            self.out.push_str("- ");
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}

fn joined(parts: &[&Option<String>]) -> Option<String> {
    joined_with(parts, ", ")
}

fn joined_with(parts: &[&Option<String>], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts.iter().filter_map(|p| p.as_deref()).collect();
    (!present.is_empty()).then(|| present.join(sep))
}

/// Append a unit to bare numeric values ("165" → "165 cm").
fn with_unit(value: Option<&str>, unit: &str) -> Option<String> {
    value.map(|v| {
        if v.trim().parse::<f64>().is_ok() {
            format!("{v} {unit}")
        } else {
            v.to_string()
        }
    })
}
