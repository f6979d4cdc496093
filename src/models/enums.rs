use serde::{Deserialize, Serialize};

/// Identifier that names no known variant of a string-keyed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported {field}: {value}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Every variant, in declaration order.
            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// AI-generated document kinds. Exactly one registry entry exists per variant.
str_enum!(DocumentType {
    MedicalReport => "medical_report",
    UndueDelayLetter => "undue_delay_letter",
    ProviderDeclaration => "provider_declaration",
    S2ApplicationForm => "s2_application_form",
    LegalJustificationLetter => "legal_justification_letter",
});

// Documents rendered by direct substitution, without the completion API.
str_enum!(StandardDocument {
    MedicalReport => "medical_report",
    UndueDelayLetter => "undue_delay_letter",
    SubmissionEmail => "submission_email",
});

str_enum!(MessageRole {
    System => "system",
    User => "user",
    Assistant => "assistant",
});

impl DocumentType {
    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MedicalReport => "Medical Report",
            Self::UndueDelayLetter => "Undue Delay Letter",
            Self::ProviderDeclaration => "Provider Declaration",
            Self::S2ApplicationForm => "S2 Application Form",
            Self::LegalJustificationLetter => "Legal Justification Letter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn document_type_round_trip() {
        for (variant, s) in [
            (DocumentType::MedicalReport, "medical_report"),
            (DocumentType::UndueDelayLetter, "undue_delay_letter"),
            (DocumentType::ProviderDeclaration, "provider_declaration"),
            (DocumentType::S2ApplicationForm, "s2_application_form"),
            (DocumentType::LegalJustificationLetter, "legal_justification_letter"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(DocumentType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn document_type_lists_five_kinds() {
        assert_eq!(DocumentType::all().len(), 5);
    }

    #[test]
    fn standard_document_round_trip() {
        for variant in StandardDocument::all() {
            assert_eq!(StandardDocument::from_str(variant.as_str()).unwrap(), *variant);
        }
    }

    #[test]
    fn unknown_value_is_rejected_not_partially_matched() {
        let err = DocumentType::from_str("medical").unwrap_err();
        assert_eq!(err.field, "DocumentType");
        assert_eq!(err.value, "medical");
        assert!(DocumentType::from_str("Medical_Report").is_err());
        assert!(DocumentType::from_str("").is_err());
    }

    #[test]
    fn serde_uses_snake_case_ids() {
        let json = serde_json::to_string(&DocumentType::S2ApplicationForm).unwrap();
        assert_eq!(json, "\"s2_application_form\"");
        let role: MessageRole = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, MessageRole::System);
    }
}
