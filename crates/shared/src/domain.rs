use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// Upper bound accepted for the optional age field.
pub const MAX_AGE: u32 = 120;

pub const FIELD_DNA_SEQUENCE: &str = "dna_sequence";
pub const FIELD_AGE: &str = "age";
pub const FIELD_GENDER: &str = "gender";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SubmissionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl FromStr for Gender {
    type Err = PayloadError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            _ => Err(PayloadError::InvalidGender(raw.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age in whole years, `0..=MAX_AGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Age(u8);

impl Age {
    pub fn new(years: u32) -> Result<Self, PayloadError> {
        if years > MAX_AGE {
            return Err(PayloadError::AgeOutOfRange { value: years });
        }
        // MAX_AGE fits in a u8
        Ok(Self(years as u8))
    }

    pub fn years(self) -> u32 {
        u32::from(self.0)
    }
}

impl TryFrom<u32> for Age {
    type Error = PayloadError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Age> for u32 {
    fn from(value: Age) -> Self {
        value.years()
    }
}

impl FromStr for Age {
    type Err = PayloadError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let years = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| PayloadError::InvalidAge(raw.to_string()))?;
        Self::new(years)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One form submission. Built fresh from the current field values and
/// dropped once the request has been sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub sequence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Age>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl SubmissionPayload {
    /// The sequence is forwarded untouched; the service owns validation.
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            age: None,
            gender: None,
        }
    }

    pub fn with_age(mut self, age: Age) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Captures raw form field values. Only the required-field rule applies
    /// to the sequence; blank age and gender mean "not provided".
    pub fn from_form_values(sequence: &str, age: &str, gender: &str) -> Result<Self, PayloadError> {
        if sequence.is_empty() {
            return Err(PayloadError::MissingSequence);
        }

        let age = if age.trim().is_empty() {
            None
        } else {
            Some(age.parse::<Age>()?)
        };
        let gender = if gender.trim().is_empty() {
            None
        } else {
            Some(gender.parse::<Gender>()?)
        };

        Ok(Self {
            sequence: sequence.to_string(),
            age,
            gender,
        })
    }

    /// Multipart field set in wire order. Unset optionals become empty strings.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            (FIELD_DNA_SEQUENCE, self.sequence.clone()),
            (
                FIELD_AGE,
                self.age.map(|age| age.to_string()).unwrap_or_default(),
            ),
            (
                FIELD_GENDER,
                self.gender
                    .map(|gender| gender.as_str().to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_optionals_serialize_as_empty_fields() {
        let payload = SubmissionPayload::new("ATCGATCGATCG");
        let fields = payload.form_fields();

        assert_eq!(fields[0], (FIELD_DNA_SEQUENCE, "ATCGATCGATCG".to_string()));
        assert_eq!(fields[1], (FIELD_AGE, String::new()));
        assert_eq!(fields[2], (FIELD_GENDER, String::new()));
    }

    #[test]
    fn set_optionals_serialize_as_plain_text() {
        let payload = SubmissionPayload::new("ATCG")
            .with_age(Age::new(42).expect("age"))
            .with_gender(Gender::Female);
        let fields = payload.form_fields();

        assert_eq!(fields[1].1, "42");
        assert_eq!(fields[2].1, "F");
    }

    #[test]
    fn form_values_treat_blank_optionals_as_unset() {
        let payload = SubmissionPayload::from_form_values("acgt", " ", "").expect("payload");
        assert_eq!(payload.sequence, "acgt");
        assert_eq!(payload.age, None);
        assert_eq!(payload.gender, None);
    }

    #[test]
    fn form_values_forward_garbage_sequence_untouched() {
        let payload = SubmissionPayload::from_form_values("  not dna!", "", "m").expect("payload");
        assert_eq!(payload.sequence, "  not dna!");
        assert_eq!(payload.gender, Some(Gender::Male));
    }

    #[test]
    fn form_values_require_sequence() {
        let err = SubmissionPayload::from_form_values("", "30", "F").expect_err("must fail");
        assert_eq!(err, PayloadError::MissingSequence);
    }

    #[test]
    fn age_is_bounded() {
        assert_eq!(Age::new(120).expect("age").years(), 120);
        assert!(matches!(
            "121".parse::<Age>(),
            Err(PayloadError::AgeOutOfRange { value: 121 })
        ));
        assert!(matches!(
            "-3".parse::<Age>(),
            Err(PayloadError::InvalidAge(_))
        ));
    }

    #[test]
    fn gender_rejects_unknown_values() {
        assert!(matches!(
            "X".parse::<Gender>(),
            Err(PayloadError::InvalidGender(_))
        ));
    }
}
