//! The notified person.
//!
//! A notified person is always built fully identified (by name) first. The lower
//! identifiability variants are produced from that record by [`crate::redaction`], never by
//! building them directly.
//!
//! Responsibilities:
//! - Define the Patient resource and its FHIR JSON shape
//! - Provide a draft builder with fill-if-absent defaults

use crate::address::Address;
use crate::constants::{
    CODE_SYSTEM_GENDER_AMTLICH_DE, EXTENSION_GENDER_AMTLICH_DE, EXTENSION_PSEUDONYM,
    PROFILE_NOTIFIED_PERSON,
};
use crate::datatypes::{Coding, ContactPoint, Element, Extension, ExtensionValue, Meta};
use crate::human_name::HumanName;
use crate::temporal::FhirDate;
use notify_uuid::Generators;
use serde::{Deserialize, Serialize};

/// Administrative gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            "unknown" => Some(Gender::Unknown),
            _ => None,
        }
    }
}

/// German civil-register gender refinement for [`Gender::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenderAmtlich {
    /// "divers"
    Diverse,
    /// "unbestimmt"
    Undetermined,
}

impl GenderAmtlich {
    fn code(self) -> &'static str {
        match self {
            GenderAmtlich::Diverse => "D",
            GenderAmtlich::Undetermined => "X",
        }
    }

    fn to_element(self) -> Element {
        Element {
            extension: vec![Extension::new(
                EXTENSION_GENDER_AMTLICH_DE,
                ExtensionValue::Coding(Coding::new(CODE_SYSTEM_GENDER_AMTLICH_DE, self.code())),
            )],
        }
    }
}

/// Patient resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(rename = "_gender", skip_serializing_if = "Option::is_none")]
    pub gender_element: Option<Element>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<FhirDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
}

impl Patient {
    /// The record-linkage pseudonym, if present.
    pub fn pseudonym(&self) -> Option<&Extension> {
        self.extension.iter().find(|e| e.url == EXTENSION_PSEUDONYM)
    }
}

/// Draft for a fully identified notified person.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientBuilder {
    id: Option<String>,
    profile: Option<String>,
    names: Vec<HumanName>,
    telecom: Vec<ContactPoint>,
    gender: Option<Gender>,
    gender_amtlich: Option<GenderAmtlich>,
    birth_date: Option<FhirDate>,
    addresses: Vec<Address>,
    pseudonym: Option<Extension>,
}

impl PatientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn name(mut self, name: HumanName) -> Self {
        self.names.push(name);
        self
    }

    pub fn telecom(mut self, contact: ContactPoint) -> Self {
        self.telecom.push(contact);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Sets gender to `other` with the civil-register refinement.
    pub fn gender_amtlich(mut self, value: GenderAmtlich) -> Self {
        self.gender = Some(Gender::Other);
        self.gender_amtlich = Some(value);
        self
    }

    pub fn birth_date(mut self, birth_date: FhirDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    /// Attaches an opaque pseudonym extension.
    pub fn pseudonym(mut self, pseudonym: Extension) -> Self {
        self.pseudonym = Some(pseudonym);
        self
    }

    /// Attaches a pseudonym given as a plain token.
    pub fn pseudonym_token(self, token: impl Into<String>) -> Self {
        self.pseudonym(Extension::new(
            EXTENSION_PSEUDONYM,
            ExtensionValue::String(token.into()),
        ))
    }

    /// Fills id and profile if they are unset.
    pub fn set_defaults(mut self, generators: &Generators) -> Self {
        if self.id.is_none() {
            self.id = Some(generators.next_id().to_string());
        }
        if self.profile.is_none() {
            self.profile = Some(PROFILE_NOTIFIED_PERSON.to_string());
        }
        self
    }

    pub fn build(&self) -> Patient {
        Patient {
            id: self.id.clone().unwrap_or_default(),
            meta: self
                .profile
                .as_ref()
                .map(|p| Meta::with_profile(p.clone()))
                .unwrap_or_default(),
            extension: self.pseudonym.iter().cloned().collect(),
            name: self.names.clone(),
            telecom: self.telecom.clone(),
            gender: self.gender,
            gender_element: self.gender_amtlich.map(GenderAmtlich::to_element),
            birth_date: self.birth_date,
            address: self.addresses.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::human_name::HumanNameBuilder;
    use notify_uuid::{FixedClock, SequentialIdGenerator};

    fn generators() -> Generators {
        Generators::new(
            SequentialIdGenerator::new(),
            FixedClock::parse("2024-03-01T10:00:00Z").unwrap(),
        )
    }

    #[test]
    fn set_defaults_fills_id_and_profile() {
        let patient = PatientBuilder::new().set_defaults(&generators()).build();

        assert_eq!(patient.id, "00000000-0000-0000-0000-000000000001");
        assert_eq!(patient.meta.profile, vec![PROFILE_NOTIFIED_PERSON.to_string()]);
    }

    #[test]
    fn set_defaults_is_idempotent() {
        let g = generators();
        let once = PatientBuilder::new().set_defaults(&g);
        let twice = once.clone().set_defaults(&g);

        assert_eq!(once, twice);
    }

    #[test]
    fn set_defaults_keeps_explicit_values() {
        let patient = PatientBuilder::new()
            .id("p1")
            .profile("urn:custom")
            .set_defaults(&generators())
            .build();

        assert_eq!(patient.id, "p1");
        assert_eq!(patient.meta.profile, vec!["urn:custom".to_string()]);
    }

    #[test]
    fn gender_amtlich_sets_other_with_extension() {
        let patient = PatientBuilder::new()
            .gender_amtlich(GenderAmtlich::Diverse)
            .build();

        assert_eq!(patient.gender, Some(Gender::Other));
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["_gender"]["extension"][0]["valueCoding"]["code"], "D");
    }

    #[test]
    fn serializes_fhir_shape() {
        let patient = PatientBuilder::new()
            .id("p1")
            .name(
                HumanNameBuilder::new()
                    .given("Sarah")
                    .family("Williams")
                    .build()
                    .unwrap(),
            )
            .gender(Gender::Female)
            .birth_date(FhirDate::parse("1992-03-20").unwrap())
            .pseudonym_token("abc123")
            .build();

        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["birthDate"], "1992-03-20");
        assert_eq!(json["gender"], "female");
        assert_eq!(json["name"][0]["family"], "Williams");
        assert_eq!(json["extension"][0]["valueString"], "abc123");
        assert!(json.get("address").is_none());
        assert_eq!(patient.pseudonym().and_then(Extension::value_string), Some("abc123"));
    }

    #[test]
    fn gender_parse_is_case_insensitive() {
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse("x"), None);
    }
}
