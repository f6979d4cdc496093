//! Standard adult dosages for medications commonly listed on bariatric
//! referrals. Used to complete bare medication names entered on the form.

/// Medication name → standard dosage wording.
const STANDARD_DOSAGES: &[(&str, &str)] = &[
    // Cardiovascular
    ("Amlodipine", "5-10 mg once daily"),
    ("Atorvastatin", "20-80 mg once daily in the evening"),
    ("Lisinopril", "10-40 mg once daily"),
    ("Metoprolol", "25-100 mg twice daily"),
    ("Simvastatin", "20-40 mg once daily in the evening"),
    ("Ramipril", "2.5-10 mg once daily"),
    ("Bisoprolol", "1.25-10 mg once daily"),
    // Diabetes
    ("Metformin", "500-1000 mg twice daily with meals"),
    ("Gliclazide", "40-160 mg once daily with breakfast"),
    ("Insulin Lantus", "As per individual requirements, usually once daily"),
    ("Insulin NovoRapid", "As per individual requirements with meals"),
    // Pain management
    ("Gabapentin", "300-600 mg three times daily"),
    ("Pregabalin", "75-150 mg twice daily"),
    ("Codeine", "30-60 mg every 4-6 hours as needed (max 240mg/24h)"),
    ("Tramadol", "50-100 mg every 4-6 hours as needed (max 400mg/24h)"),
    ("Zapain", "30/500 mg up to four times daily as needed"),
    ("Co-codamol", "30/500 mg up to four times daily as needed"),
    // Mental health
    ("Sertraline", "50-200 mg once daily"),
    ("Citalopram", "20-40 mg once daily"),
    ("Fluoxetine", "20-60 mg once daily"),
    ("Amitriptyline", "10-75 mg once daily at bedtime"),
    ("Mirtazapine", "15-45 mg once daily at bedtime"),
    // Hormones
    ("Levothyroxine", "25-200 mcg once daily on empty stomach"),
    ("Estradiol", "1-2 mg once daily"),
    ("Testosterone gel", "Apply as directed once daily"),
    // Gastrointestinal
    ("Omeprazole", "20-40 mg once daily before food"),
    ("Lansoprazole", "15-30 mg once daily before food"),
    ("Mesalazine", "800 mg three times daily with food"),
    ("Prednisolone", "5-60 mg once daily with food (as prescribed)"),
    // Bone health
    ("Alendronic acid", "70 mg once weekly on empty stomach"),
    ("Ibandronic acid", "150 mg once monthly on empty stomach"),
    ("Calcium carbonate", "1.25 g twice daily with food"),
    ("Vitamin D3", "800-4000 IU once daily"),
    // Antihistamines
    ("Fexofenadine", "120-180 mg once daily"),
    ("Cetirizine", "10 mg once daily"),
    ("Loratadine", "10 mg once daily"),
    // Urological
    ("Mirabegron", "25-50 mg once daily"),
    ("Tamsulosin", "400 mcg once daily after food"),
    ("Finasteride", "5 mg once daily"),
    // Respiratory
    ("Salbutamol inhaler", "1-2 puffs when required (max 8 puffs/24h)"),
    ("Beclomethasone inhaler", "1-2 puffs twice daily"),
    ("Montelukast", "10 mg once daily in the evening"),
    // Supplements
    ("Vitamin B12", "1000 mcg once daily"),
    ("Iron tablets", "200 mg once daily on empty stomach"),
    ("Folic acid", "5 mg once daily"),
];

/// Look up the standard dosage for a medication name.
///
/// Exact name first, then case-insensitive containment in either direction
/// (so "metformin 500" and "Insulin" both resolve).
pub fn standard_dosage(name: &str) -> Option<(&'static str, &'static str)> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(&(drug, dosage)) = STANDARD_DOSAGES.iter().find(|(drug, _)| *drug == trimmed) {
        return Some((drug, dosage));
    }
    let lower = trimmed.to_lowercase();
    STANDARD_DOSAGES
        .iter()
        .find(|(drug, _)| {
            let drug_lower = drug.to_lowercase();
            drug_lower.contains(&lower) || lower.contains(&drug_lower)
        })
        .map(|&(drug, dosage)| (drug, dosage))
}

/// Medication entry with its standard dosage appended when known.
///
/// Entries that already carry a dose (contain a digit) are left as written.
pub fn with_standard_dosage(entry: &str) -> String {
    let trimmed = entry.trim();
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        return trimmed.to_string();
    }
    match standard_dosage(trimmed) {
        Some((drug, dosage)) => format!("{drug} - {dosage}"),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert_eq!(
            standard_dosage("Metformin"),
            Some(("Metformin", "500-1000 mg twice daily with meals"))
        );
    }

    #[test]
    fn case_insensitive_partial_match() {
        let (drug, _) = standard_dosage("lantus").unwrap();
        assert_eq!(drug, "Insulin Lantus");
        let (drug, _) = standard_dosage("sertraline tablets").unwrap();
        assert_eq!(drug, "Sertraline");
    }

    #[test]
    fn unknown_medication_passes_through() {
        assert!(standard_dosage("Semaglutide").is_none());
        assert_eq!(with_standard_dosage("  Semaglutide "), "Semaglutide");
    }

    #[test]
    fn bare_name_gets_dosage() {
        assert_eq!(
            with_standard_dosage("omeprazole"),
            "Omeprazole - 20-40 mg once daily before food"
        );
    }

    #[test]
    fn entry_with_dose_is_kept() {
        assert_eq!(with_standard_dosage("Metformin 850 mg bd"), "Metformin 850 mg bd");
    }

    #[test]
    fn empty_name_has_no_dosage() {
        assert!(standard_dosage("   ").is_none());
    }
}
