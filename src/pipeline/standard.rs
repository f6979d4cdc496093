//! Standard documents rendered by direct substitution, without the
//! completion API. Output is Markdown-flavoured plain text.

use chrono::NaiveDate;

use super::dosage::with_standard_dosage;
use super::formatter::NOT_SPECIFIED;
use super::schedule::{format_month_year, parse_clinical_date, FollowUpSchedule};
use crate::models::{PatientRecord, StandardDocument};

/// Render a standard document for `record`, dated relative to `today`.
pub fn render_standard(kind: StandardDocument, record: &PatientRecord, today: NaiveDate) -> String {
    let fields = Fields::new(record, today);
    match kind {
        StandardDocument::MedicalReport => medical_report(&fields),
        StandardDocument::UndueDelayLetter => undue_delay_letter(&fields),
        StandardDocument::SubmissionEmail => submission_email(&fields),
    }
}

/// Record values resolved to display text once.
struct Fields {
    name: String,
    dob: String,
    nhs: String,
    address: String,
    contact: String,
    sex: String,
    age: String,
    height: String,
    weight: String,
    bmi: String,
    comorbidities: Vec<String>,
    medications: Vec<String>,
    history: String,
    procedure: String,
    hospital: String,
    surgeon: String,
    applicant: String,
    treatment_month: String,
    schedule: Option<FollowUpSchedule>,
}

impl Fields {
    fn new(record: &PatientRecord, today: NaiveDate) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_SPECIFIED.to_string());
        let address = match (&record.address, &record.postcode) {
            (Some(a), Some(p)) => format!("{a}, {p}, United Kingdom"),
            (Some(a), None) => format!("{a}, United Kingdom"),
            (None, Some(p)) => format!("{p}, United Kingdom"),
            (None, None) => NOT_SPECIFIED.to_string(),
        };
        let treatment = record.treatment_date.as_deref().and_then(parse_clinical_date);
        let applicant = [record.applicant_title.as_deref(), record.applicant_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            name: record.display_name().unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            dob: text(&record.date_of_birth),
            nhs: text(&record.nhs_number),
            address,
            contact: format!(
                "{} / {}",
                record.phone.as_deref().unwrap_or(NOT_SPECIFIED),
                record.email.as_deref().unwrap_or(NOT_SPECIFIED)
            ),
            sex: record
                .sex
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_else(|| "patient".to_string()),
            age: record
                .age_on(today)
                .map(|a| format!("{a}-year-old"))
                .unwrap_or_else(|| "adult".to_string()),
            height: record
                .height
                .as_deref()
                .map(|h| format!("{h} cm"))
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            weight: record
                .weight
                .as_deref()
                .map(|w| format!("{w} kg"))
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            bmi: record.bmi().unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            comorbidities: record.comorbidities.clone(),
            medications: record.medications.iter().map(|m| with_standard_dosage(m)).collect(),
            history: text(&record.treatment_history),
            procedure: text(&record.surgical_procedure),
            hospital: text(&record.hospital_name),
            surgeon: text(&record.surgeon_name),
            applicant: if applicant.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                applicant
            },
            treatment_month: treatment
                .map(format_month_year)
                .unwrap_or_else(|| "a date to be confirmed".to_string()),
            schedule: treatment.and_then(FollowUpSchedule::from_surgery),
        }
    }

    fn schedule_lines(&self) -> String {
        match &self.schedule {
            Some(schedule) => bullets(&schedule.render_lines()),
            None => "- To be scheduled".to_string(),
        }
    }

    fn leading_comorbidities(&self, n: usize) -> String {
        if self.comorbidities.is_empty() {
            return NOT_SPECIFIED.to_string();
        }
        self.comorbidities
            .iter()
            .take(n)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return format!("- {NOT_SPECIFIED}");
    }
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn medical_report(f: &Fields) -> String {
    format!(
        "# Medical Report - S2 Funding Request

## Patient Identification

Full name: {name}
Date of birth: {dob}
NHS number: {nhs}
Address: {address}
Contact: {contact}

## Clinical Data

Height: {height}
Weight: {weight}
BMI: {bmi}

### Comorbidities

{comorbidities}

### Current Medications

{medications}

## Non-Surgical Management

{history}

## NICE Eligibility Criteria

- BMI of 40 or above confirmed ({bmi})
- Severe comorbidities including {leading}
- Patient motivation: explicit, sustained request for {procedure_lower}

## Surgical Indication

Proposed procedure: {procedure}
Rationale: morbid obesity with severe comorbidities and failure of conservative management.

## Receiving Hospital and Surgeon

Facility: {hospital}
Surgeon: {surgeon}
Accreditation: compliant with European bariatric standards

## Treatment and Follow-Up Schedule (S2 Programme)

{schedule}

## Medical Justification for Urgency and Undue Delay

- Cardiovascular risk: delaying surgery beyond 12 months is associated with worsening hypertension and dyslipidaemia (Arterburn et al., JAMA 2015).
- Metabolic deterioration: earlier surgery substantially reduces type 2 diabetes incidence (Sjöström et al., NEJM 2007).
- Mortality: bariatric surgery reduces all-cause mortality; delay prolongs exposure to preventable risk (Welbourn et al., Lancet 2014).

NHS waiting times for bariatric surgery currently range from 18 to 34 months depending on region, which constitutes an undue delay for this patient.

## Conclusion

{name} meets NICE eligibility for bariatric surgery. {procedure} is medically indicated, urgent and justified. Immediate approval of S2 funding is required to ensure timely surgery in an accredited European centre.

{surgeon}
Consultant Bariatric Surgeon
{hospital}",
        name = f.name,
        dob = f.dob,
        nhs = f.nhs,
        address = f.address,
        contact = f.contact,
        height = f.height,
        weight = f.weight,
        bmi = f.bmi,
        comorbidities = bullets(&f.comorbidities),
        medications = bullets(&f.medications),
        history = f.history,
        leading = f.leading_comorbidities(3),
        procedure = f.procedure,
        procedure_lower = f.procedure.to_lowercase(),
        hospital = f.hospital,
        surgeon = f.surgeon,
        schedule = f.schedule_lines(),
    )
}

fn undue_delay_letter(f: &Fields) -> String {
    format!(
        "# Letter on Undue Delay - S2 Funding Request

{surgeon}
Consultant Bariatric Surgeon
{hospital}

Subject: Medical justification regarding undue delay in access to bariatric surgery for {name} (DOB: {dob}, NHS No: {nhs})

Dear Sir/Madam,

I am writing to provide medical evidence supporting the urgency of bariatric surgery for {name} and to set out the risks of undue delay should surgery be postponed within the NHS for 12 to 18 months. Surgery is proposed for {month}.

## Patient Background

{name} is a {age} {sex} presenting with morbid obesity (BMI {bmi}, {weight}, {height}) and the following comorbidities:

{comorbidities}

Conservative management has been attempted without sustained success and all NICE criteria for bariatric surgery are met.

## Risks of Undue Delay in This Patient

- Progression of cardiovascular disease and increased mortality risk
- Worsening glycaemic control and metabolic complications
- Progressive musculoskeletal disability
- Psychological deterioration

## Evidence

Arterburn et al. (JAMA 2015), Sjöström et al. (NEJM 2007) and Welbourn et al. (Lancet 2014) consistently show that timely bariatric surgery reduces morbidity and mortality.

## Conclusion

A delay of 12 to 18 months is not medically acceptable for {name}. I therefore support immediate S2 authorisation.

Yours faithfully,

{surgeon}
{hospital}",
        surgeon = f.surgeon,
        hospital = f.hospital,
        name = f.name,
        dob = f.dob,
        nhs = f.nhs,
        month = f.treatment_month,
        age = f.age,
        sex = f.sex,
        bmi = f.bmi,
        weight = f.weight,
        height = f.height,
        comorbidities = bullets(&f.comorbidities),
    )
}

fn submission_email(f: &Fields) -> String {
    format!(
        "Subject: S2 Prior Authorisation Request - {name} (DOB: {dob}, NHS No: {nhs})

To: NHS England - Overseas Healthcare Services (S2 Team)

Dear Sir/Madam,

In accordance with Article 20 of Regulation (EC) No 883/2004 and Regulation (EC) No 987/2009, we request S2 prior authorisation for {name}, for {procedure_lower} at {hospital}, under the responsibility of {surgeon}.

## Legal Framework

- Article 20 of Regulation (EC) 883/2004: authorisation must be granted where treatment cannot be provided in the UK within a medically justifiable time.
- CJEU: Watts (C-372/04), Smits-Peerbooms (C-157/99), Elchinov (C-173/09), Petru (C-268/13).

## Medical Situation

- BMI {bmi} ({weight}, {height})
- Comorbidities: {leading}
- Failed conservative treatment
- Planned surgery: {schedule_first}

NHS waiting times for bariatric surgery regularly reach 18 to 34 months by region, with more than 8,000 patients on waiting lists (RCS 2024). This is manifestly not medically acceptable for this patient.

We therefore request immediate granting of S2 authorisation.

Yours faithfully,

{applicant}
Patient Representative

Attached documents:
1. Completed and signed S2 form
2. Detailed medical report
3. Undue delay justification letter
4. Provider declaration
5. Proof of residence and nationality
6. GP correspondence",
        name = f.name,
        dob = f.dob,
        nhs = f.nhs,
        procedure_lower = f.procedure.to_lowercase(),
        hospital = f.hospital,
        surgeon = f.surgeon,
        bmi = f.bmi,
        weight = f.weight,
        height = f.height,
        leading = f.leading_comorbidities(5),
        schedule_first = f.treatment_month,
        applicant = f.applicant,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn karen() -> PatientRecord {
        PatientRecord::from_value(&json!({
            "firstName": "Karen",
            "lastName": "Griffin",
            "dateOfBirth": "1980-06-15",
            "sex": "Female",
            "nhsNumber": "6085748752",
            "height": 165,
            "weight": 128.2,
            "comorbidities": ["Type 2 diabetes", "Hypertension", "Sleep apnoea", "Osteoarthritis"],
            "medications": ["Metformin"],
            "treatmentDate": "2025-03-10"
        }))
        .unwrap()
        .with_defaults()
    }

    #[test]
    fn medical_report_includes_schedule_and_derived_bmi() {
        let text = render_standard(StandardDocument::MedicalReport, &karen(), today());
        assert!(text.contains("Full name: Karen Griffin"));
        assert!(text.contains("BMI: 47.1"));
        assert!(text.contains("- Surgery: 10/03/2025"));
        assert!(text.contains("- Follow-up at 1 year: 10/03/2026"));
        assert!(text.contains("Metformin - 500-1000 mg twice daily with meals"));
        assert!(text.contains("Type 2 diabetes, Hypertension, Sleep apnoea"));
        assert!(!text.contains("Osteoarthritis, "));
    }

    #[test]
    fn undue_delay_letter_uses_age_and_month() {
        let text = render_standard(StandardDocument::UndueDelayLetter, &karen(), today());
        assert!(text.contains("a 44-year-old female"));
        assert!(text.contains("Surgery is proposed for March 2025."));
        assert!(text.contains("Hôpital de La Tour"));
    }

    #[test]
    fn submission_email_signed_by_applicant() {
        let text = render_standard(StandardDocument::SubmissionEmail, &karen(), today());
        assert!(text.starts_with("Subject: S2 Prior Authorisation Request - Karen Griffin"));
        assert!(text.contains("Doctor Dr Stéphane Bach"));
        assert!(text.contains("for sleeve gastrectomy at Hôpital de La Tour"));
    }

    #[test]
    fn empty_record_renders_placeholders() {
        for kind in StandardDocument::all() {
            let text = render_standard(*kind, &PatientRecord::default(), today());
            assert!(text.contains(NOT_SPECIFIED), "{kind}");
            assert!(!text.contains("{"), "{kind}");
        }
        let report =
            render_standard(StandardDocument::MedicalReport, &PatientRecord::default(), today());
        assert!(report.contains("- To be scheduled"));
    }

    #[test]
    fn out_of_range_treatment_date_renders_unscheduled() {
        for raw in ["+262142-12-31", "-262143-01-05"] {
            let record = PatientRecord::from_value(&json!({"treatmentDate": raw})).unwrap();
            let report = render_standard(StandardDocument::MedicalReport, &record, today());
            assert!(report.contains("- To be scheduled"), "{raw}");
        }
    }
}
