//! Notification case files.
//!
//! A case file is a YAML description of one disease notification: the notifier, the notified
//! person (always captured by name), questionnaire answers and optional overrides for ids and
//! timestamps. [`NotificationCase::assemble`] turns it into a bundle at a chosen
//! identifiability tier.
//!
//! The wire structs here use `deny_unknown_fields`; parse failures report the failing path.

use crate::address::{Address, AddressBuilder, AddressUse};
use crate::bundle::{Bundle, NotificationBundleBuilder};
use crate::composition::{CompositionBuilder, CompositionSection, CompositionStatus};
use crate::config::AssemblerConfig;
use crate::constants::EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON;
use crate::datatypes::{Coding, ContactPoint, Extension, ExtensionValue};
use crate::human_name::{HumanName, HumanNameBuilder};
use crate::organization::{FacilityInput, Organization, OrganizationBuilder};
use crate::patient::{Gender, GenderAmtlich, Patient, PatientBuilder};
use crate::practitioner::{
    Practitioner, PractitionerBuilder, PractitionerRole, PractitionerRoleBuilder, RoleTarget,
};
use crate::questionnaire::{
    AnswerValue, QuestionnaireItemBuilder, QuestionnaireResponse, QuestionnaireResponseBuilder,
};
use crate::redaction::{default_address_selection, IdentifiabilityTier, Redaction};
use crate::reference::Reference;
use crate::temporal::{parse_date_time, FhirDate};
use crate::{FhirError, FhirResult};
use notify_uuid::Generators;
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Wire format
// ============================================================================

/// Root of a case file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationCase {
    #[serde(default)]
    pub bundle: BundleInput,
    #[serde(default)]
    pub composition: CompositionInput,
    pub notifier: NotifierInput,
    #[serde(default)]
    pub notified_person: Option<PersonInput>,
    #[serde(default)]
    pub questionnaire_responses: Vec<QuestionnaireResponseInput>,
    /// Further resources given as raw FHIR, appended to the bundle unchanged.
    #[serde(default)]
    pub extra_resources: Vec<serde_yaml::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NameInput {
    #[serde(default)]
    pub prefix: Vec<String>,
    #[serde(default)]
    pub given: Vec<String>,
    #[serde(default)]
    pub family: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressInput {
    #[serde(rename = "use", default)]
    pub address_use: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierInput {
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub practitioner: Option<PractitionerInput>,
    #[serde(default)]
    pub organization: Option<OrganizationInput>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PractitionerInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<NameInput>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<AddressInput>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub contact_person: Option<NameInput>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<NameInput>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Civil-register refinement: `D` (divers) or `X` (unbestimmt).
    #[serde(default)]
    pub gender_amtlich: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AddressInput>,
    /// Facility the person is currently staying at.
    #[serde(default)]
    pub facility: Option<FacilityInput>,
    #[serde(default)]
    pub pseudonym: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionnaireResponseInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub questionnaire: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemInput {
    pub link_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

/// One answer. Exactly one value field must be set.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerInput {
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default)]
    pub boolean: Option<bool>,
    #[serde(default)]
    pub integer: Option<i64>,
    #[serde(default)]
    pub decimal: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub coding: Option<CodingInput>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodingInput {
    pub system: String,
    pub code: String,
    #[serde(default)]
    pub display: Option<String>,
}

// ============================================================================
// Loading
// ============================================================================

impl NotificationCase {
    /// Parses a case from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] naming the failing path if the YAML does not match
    /// the case format.
    pub fn from_yaml_str(text: &str) -> FhirResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(text);
        serde_path_to_error::deserialize(deserializer).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            FhirError::Translation(format!("case file schema mismatch at {path}: {source}"))
        })
    }

    /// Reads and parses a case file.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_yaml_str`].
    pub fn from_path(path: &Path) -> FhirResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// The by-name person together with the facility they are staying at.
struct CapturedPerson {
    patient: Patient,
    facility: Option<Organization>,
}

impl NotificationCase {
    /// The notified person at `tier`, or `None` if the case has no notified person.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInputData`] or [`FhirError::InvalidTemporal`] for invalid
    /// person data.
    pub fn redacted_person(
        &self,
        tier: IdentifiabilityTier,
        generators: &Generators,
    ) -> FhirResult<Option<Patient>> {
        Ok(self
            .capture_person(generators)?
            .map(|captured| redact(&captured.patient, tier)))
    }

    /// Assembles the notification bundle with the person redacted to `tier`.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found in the case data.
    pub fn assemble(
        &self,
        tier: IdentifiabilityTier,
        generators: &Generators,
        config: &AssemblerConfig,
    ) -> FhirResult<Bundle> {
        let captured = self.capture_person(generators)?;
        let person = captured.as_ref().map(|c| redact(&c.patient, tier));

        let subject = person.as_ref().map(Reference::local).transpose()?;
        let responses = self
            .questionnaire_responses
            .iter()
            .map(|input| build_response(input, subject.clone(), generators))
            .collect::<FhirResult<Vec<_>>>()?;

        let composition = self.composition_builder(&responses)?.set_defaults(generators);
        let role = self.notifier_role(generators)?;

        let mut builder = NotificationBundleBuilder::new(composition.build(), config)
            .notifier_role(role);
        if let Some(person) = person {
            builder = builder.notified_person(person);
        }
        if tier == IdentifiabilityTier::ByName {
            if let Some(facility) = captured.and_then(|c| c.facility) {
                builder = builder.add_entry(facility);
            }
        }
        for response in responses {
            builder = builder.add_entry(response);
        }
        for value in &self.extra_resources {
            builder = builder.add_entry_yaml(value.clone())?;
        }

        if let Some(id) = &self.bundle.id {
            builder = builder.bundle_id(id);
        }
        if let Some(identifier) = &self.bundle.identifier {
            builder = builder.identifier(identifier);
        }
        if let Some(timestamp) = &self.bundle.timestamp {
            builder = builder.timestamp(parse_date_time(timestamp)?);
        }
        if let Some(profile) = &self.bundle.profile {
            builder = builder.profile(profile);
        }

        builder.set_defaults(generators).build()
    }

    fn composition_builder(
        &self,
        responses: &[QuestionnaireResponse],
    ) -> FhirResult<CompositionBuilder> {
        let input = &self.composition;
        let mut builder = CompositionBuilder::new();
        if let Some(id) = &input.id {
            builder = builder.id(id);
        }
        if let Some(identifier) = &input.identifier {
            builder = builder.identifier(identifier);
        }
        if let Some(status) = &input.status {
            let status = CompositionStatus::parse(status).ok_or_else(|| {
                FhirError::InvalidInputData(format!("unknown composition status '{status}'"))
            })?;
            builder = builder.status(status);
        }
        if let Some(title) = &input.title {
            builder = builder.title(title);
        }
        if let Some(date) = &input.date {
            builder = builder.date(parse_date_time(date)?);
        }
        if !responses.is_empty() {
            builder = builder.section(CompositionSection::disease_information(responses)?);
        }
        Ok(builder)
    }

    fn notifier_role(&self, generators: &Generators) -> FhirResult<PractitionerRole> {
        let notifier = &self.notifier;
        let target: RoleTarget = match (&notifier.practitioner, &notifier.organization) {
            (Some(p), None) => build_practitioner(p, generators)?.into(),
            (None, Some(o)) => build_notifier_organization(o, generators)?.into(),
            (Some(_), Some(_)) => {
                return Err(FhirError::InvalidInputData(
                    "notifier must be either a practitioner or an organization, not both".into(),
                ))
            }
            (None, None) => {
                return Err(FhirError::InvalidInputData(
                    "notifier is missing: practitioner or organization".into(),
                ))
            }
        };

        let mut builder = PractitionerRoleBuilder::new().target(target);
        if let Some(id) = &notifier.role_id {
            builder = builder.id(id);
        }
        builder.set_defaults(generators).build()
    }

    fn capture_person(&self, generators: &Generators) -> FhirResult<Option<CapturedPerson>> {
        let Some(input) = &self.notified_person else {
            return Ok(None);
        };

        let facility = match &input.facility {
            Some(facility) => facility.to_organization(generators)?,
            None => None,
        };

        let mut builder = PatientBuilder::new();
        if let Some(id) = &input.id {
            builder = builder.id(id);
        }
        if let Some(name) = input.name.as_ref().and_then(build_name) {
            builder = builder.name(name);
        }
        if let Some(gender) = &input.gender {
            let gender = Gender::parse(gender).ok_or_else(|| {
                FhirError::InvalidInputData(format!("unknown gender '{gender}'"))
            })?;
            builder = builder.gender(gender);
        }
        if let Some(code) = &input.gender_amtlich {
            let value = match code.as_str() {
                "D" => GenderAmtlich::Diverse,
                "X" => GenderAmtlich::Undetermined,
                other => {
                    return Err(FhirError::InvalidInputData(format!(
                        "unknown gender_amtlich code '{other}'"
                    )))
                }
            };
            builder = builder.gender_amtlich(value);
        }
        if let Some(birth_date) = &input.birth_date {
            builder = builder.birth_date(FhirDate::parse(birth_date)?);
        }
        for contact in contacts(input.phone.as_deref(), input.email.as_deref()) {
            builder = builder.telecom(contact);
        }
        for address in &input.addresses {
            if let Some(address) = build_address(address)? {
                builder = builder.address(address);
            }
        }
        if let Some(org) = &facility {
            builder = builder.address(facility_address(org)?);
        }
        if let Some(pseudonym) = &input.pseudonym {
            builder = builder.pseudonym_token(pseudonym);
        }

        Ok(Some(CapturedPerson {
            patient: builder.set_defaults(generators).build(),
            facility,
        }))
    }
}

fn redact(patient: &Patient, tier: IdentifiabilityTier) -> Patient {
    Redaction::redact(patient, tier, &default_address_selection(patient))
}

fn build_name(input: &NameInput) -> Option<HumanName> {
    let mut builder = HumanNameBuilder::new();
    for prefix in &input.prefix {
        builder = builder.prefix(prefix);
    }
    for given in &input.given {
        builder = builder.given(given);
    }
    if let Some(family) = &input.family {
        builder = builder.family(family);
    }
    builder.build()
}

fn contacts(phone: Option<&str>, email: Option<&str>) -> Vec<ContactPoint> {
    let phone = phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ContactPoint::phone);
    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(ContactPoint::email);
    phone.into_iter().chain(email).collect()
}

fn address_builder(input: &AddressInput) -> FhirResult<AddressBuilder> {
    let mut builder = AddressBuilder::new();
    if let Some(code) = &input.address_use {
        let address_use = AddressUse::parse(code).ok_or_else(|| {
            FhirError::InvalidInputData(format!("unknown address use '{code}'"))
        })?;
        builder = builder.address_use(address_use);
    }
    if let Some(street) = &input.street {
        builder = builder.street(street);
    }
    if let Some(number) = &input.house_number {
        builder = builder.house_number(number);
    }
    if let Some(additional) = &input.additional_info {
        builder = builder.additional_info(additional);
    }
    if let Some(postal_code) = &input.postal_code {
        builder = builder.postal_code(postal_code);
    }
    if let Some(city) = &input.city {
        builder = builder.city(city);
    }
    if let Some(country) = &input.country {
        builder = builder.country(country);
    }
    Ok(builder)
}

fn build_address(input: &AddressInput) -> FhirResult<Option<Address>> {
    Ok(address_builder(input)?.build_optional())
}

/// The person's `current` address: the facility's address tagged with the facility reference.
fn facility_address(org: &Organization) -> FhirResult<Address> {
    let mut address = org.address.first().cloned().unwrap_or_default();
    address.extension.retain(|e| AddressUse::from_extension(e).is_none());
    address.extension.push(AddressUse::Current.to_extension());
    address.extension.push(Extension::new(
        EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON,
        ExtensionValue::Reference(Reference::to(org)?),
    ));
    Ok(address)
}

fn build_practitioner(
    input: &PractitionerInput,
    generators: &Generators,
) -> FhirResult<Practitioner> {
    let mut builder = PractitionerBuilder::new();
    if let Some(id) = &input.id {
        builder = builder.id(id);
    }
    if let Some(name) = input.name.as_ref().and_then(build_name) {
        builder = builder.name(name);
    }
    for contact in contacts(input.phone.as_deref(), input.email.as_deref()) {
        builder = builder.telecom(contact);
    }
    if let Some(address) = &input.address {
        if let Some(address) = build_address(address)? {
            builder = builder.address(address);
        }
    }
    Ok(builder.set_defaults(generators).build())
}

fn build_notifier_organization(
    input: &OrganizationInput,
    generators: &Generators,
) -> FhirResult<Organization> {
    let mut builder = OrganizationBuilder::notifier_facility();
    if let Some(id) = &input.id {
        builder = builder.id(id);
    }
    if let Some(name) = &input.name {
        builder = builder.name(name);
    }
    for contact in contacts(input.phone.as_deref(), input.email.as_deref()) {
        builder = builder.telecom(contact);
    }
    if let Some(address) = &input.address {
        if let Some(address) = build_address(address)? {
            builder = builder.address(address);
        }
    }
    if let Some(name) = input.contact_person.as_ref().and_then(build_name) {
        builder = builder.contact_person(name);
    }
    Ok(builder.set_defaults(generators).build())
}

fn build_response(
    input: &QuestionnaireResponseInput,
    subject: Option<Reference>,
    generators: &Generators,
) -> FhirResult<QuestionnaireResponse> {
    let mut builder = QuestionnaireResponseBuilder::new();
    if let Some(id) = &input.id {
        builder = builder.id(id);
    }
    if let Some(questionnaire) = &input.questionnaire {
        builder = builder.questionnaire(questionnaire);
    }
    if let Some(subject) = subject {
        builder = builder.subject(subject);
    }
    for item in &input.items {
        builder = builder.item(item_builder(item)?);
    }
    Ok(builder.set_defaults(generators).build())
}

fn item_builder(input: &ItemInput) -> FhirResult<QuestionnaireItemBuilder> {
    let mut builder = QuestionnaireItemBuilder::new(&input.link_id);
    if let Some(text) = &input.text {
        builder = builder.text(text);
    }
    for answer in &input.answers {
        let value = answer_value(answer, &input.link_id)?;
        let follow_ups = answer
            .items
            .iter()
            .map(item_builder)
            .collect::<FhirResult<Vec<_>>>()?;
        builder = builder.answer_with_items(value, follow_ups);
    }
    for item in &input.items {
        builder = builder.item(item_builder(item)?);
    }
    Ok(builder)
}

fn answer_value(input: &AnswerInput, link_id: &str) -> FhirResult<AnswerValue> {
    let mut values = Vec::new();
    if let Some(v) = &input.string {
        values.push(AnswerValue::String(v.clone()));
    }
    if let Some(v) = input.boolean {
        values.push(AnswerValue::Boolean(v));
    }
    if let Some(v) = input.integer {
        values.push(AnswerValue::Integer(v));
    }
    if let Some(v) = input.decimal {
        values.push(AnswerValue::Decimal(v));
    }
    if let Some(v) = &input.date {
        values.push(AnswerValue::Date(FhirDate::parse(v)?));
    }
    if let Some(v) = &input.date_time {
        values.push(AnswerValue::DateTime(parse_date_time(v)?));
    }
    if let Some(v) = &input.coding {
        let mut coding = Coding::new(&v.system, &v.code);
        if let Some(display) = &v.display {
            coding = coding.with_display(display);
        }
        values.push(AnswerValue::Coding(coding));
    }
    if let Some(v) = &input.reference {
        values.push(AnswerValue::Reference(Reference::from_text(v)));
    }

    if values.len() != 1 {
        return Err(FhirError::InvalidInputData(format!(
            "answer to '{link_id}' must carry exactly one value, found {}",
            values.len()
        )));
    }
    Ok(values.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        PROFILE_NOTIFIED_PERSON_FACILITY, PROFILE_NOTIFIED_PERSON_NOT_BY_NAME,
    };
    use crate::resource::{DomainResource, Resource, ResourceType};
    use notify_uuid::{FixedClock, SequentialIdGenerator};

    const CASE: &str = r#"
bundle:
  id: b1
  timestamp: "2024-03-01T12:00:00Z"
composition:
  id: c1
  date: "01.03.2024 11:30"
notifier:
  role_id: r1
  organization:
    id: o1
    name: Labor Berlin
    phone: "+49 30 1234"
    address:
      street: Sylter Straße
      house_number: "2"
      postal_code: "13353"
      city: Berlin
      country: DE
notified_person:
  id: p1
  name:
    given: [Sarah]
    family: Williams
  gender: female
  birth_date: "10.10.1975"
  addresses:
    - use: primary
      street: Seestraße
      house_number: "10"
      postal_code: "12345"
      city: Berlin
      country: DE
  facility:
    id: hospital
    name: Charité
    postal_code: "10117"
    city: Berlin
    country: DE
  pseudonym: pseudo-1
questionnaire_responses:
  - id: qr1
    items:
      - link_id: isolation
      - link_id: hospitalized
        answers:
          - boolean: true
            items:
              - link_id: hospitalizedSince
                answers:
                  - date: "2024-02-27"
"#;

    fn generators() -> Generators {
        Generators::new(
            SequentialIdGenerator::new(),
            FixedClock::parse("2024-03-01T10:00:00Z").unwrap(),
        )
    }

    fn case() -> NotificationCase {
        NotificationCase::from_yaml_str(CASE).expect("case parses")
    }

    fn types(bundle: &Bundle) -> Vec<ResourceType> {
        bundle.resources().map(|r| r.resource_type()).collect()
    }

    #[test]
    fn by_name_bundle_contains_facility() {
        let bundle = case()
            .assemble(
                IdentifiabilityTier::ByName,
                &generators(),
                &AssemblerConfig::default(),
            )
            .expect("bundle");

        assert_eq!(
            types(&bundle),
            vec![
                ResourceType::Composition,
                ResourceType::PractitionerRole,
                ResourceType::Organization,
                ResourceType::Patient,
                ResourceType::Organization,
                ResourceType::QuestionnaireResponse,
            ]
        );
        assert_eq!(bundle.id(), "b1");
        assert_eq!(bundle.entries()[2].resource.id(), "o1");
        assert!(bundle.entries()[4]
            .resource
            .has_profile(PROFILE_NOTIFIED_PERSON_FACILITY));

        let composition = bundle.composition().unwrap();
        assert_eq!(composition.author[0].reference(), Some("PractitionerRole/r1"));
        assert_eq!(
            composition.subject.as_ref().and_then(Reference::reference),
            Some("Patient/p1")
        );
        assert_eq!(
            composition.section[0].entry[0].reference(),
            Some("QuestionnaireResponse/qr1")
        );
    }

    #[test]
    fn not_by_name_bundle_carries_reduced_person() {
        let bundle = case()
            .assemble(
                IdentifiabilityTier::NotByName,
                &generators(),
                &AssemblerConfig::default(),
            )
            .unwrap();

        assert_eq!(bundle.entries().len(), 5);
        let patient = bundle
            .resources()
            .find_map(|r| match r {
                Resource::Patient(p) => Some(p),
                _ => None,
            })
            .expect("patient entry");

        assert!(patient.has_profile(PROFILE_NOTIFIED_PERSON_NOT_BY_NAME));
        assert!(patient.name.is_empty());
        assert_eq!(patient.birth_date.map(|d| d.to_string()), Some("1975-10".into()));
        assert_eq!(patient.address.len(), 1);
        assert_eq!(patient.address[0].postal_code.as_deref(), Some("123"));
        assert!(patient.pseudonym().is_some());
    }

    #[test]
    fn unanswered_questions_are_dropped() {
        let bundle = case()
            .assemble(
                IdentifiabilityTier::Anonymous,
                &generators(),
                &AssemblerConfig::default(),
            )
            .unwrap();

        let response = bundle
            .resources()
            .find_map(|r| match r {
                Resource::QuestionnaireResponse(q) => Some(q),
                _ => None,
            })
            .expect("response entry");
        assert_eq!(response.item.len(), 1);
        assert_eq!(response.item[0].link_id, "hospitalized");
        assert_eq!(response.item[0].answer[0].item[0].link_id, "hospitalizedSince");
        assert_eq!(
            response.subject.as_ref().and_then(Reference::reference),
            Some("Patient/p1")
        );
    }

    #[test]
    fn redacted_person_without_person_is_none() {
        let mut case = case();
        case.notified_person = None;
        assert_eq!(
            case.redacted_person(IdentifiabilityTier::Anonymous, &generators())
                .unwrap(),
            None
        );
    }

    #[test]
    fn by_name_person_has_current_facility_address() {
        let patient = case()
            .redacted_person(IdentifiabilityTier::ByName, &generators())
            .unwrap()
            .expect("person");

        let current = patient
            .address
            .iter()
            .find(|a| a.address_use() == Some(AddressUse::Current))
            .expect("current address");
        assert_eq!(current.postal_code.as_deref(), Some("10117"));
        assert_eq!(
            current.facility_reference().and_then(Reference::reference),
            Some("Organization/hospital")
        );
    }

    #[test]
    fn explicitly_selected_facility_address_loses_its_facility_link() {
        let source = case()
            .redacted_person(IdentifiabilityTier::ByName, &generators())
            .unwrap()
            .expect("person");

        let patient = Redaction::redact(&source, IdentifiabilityTier::NonNominal, &source.address);

        assert_eq!(patient.address.len(), 2);
        assert_eq!(patient.address[0].address_use(), Some(AddressUse::Primary));
        assert_eq!(patient.address[0].postal_code.as_deref(), Some("123"));

        let stay = &patient.address[1];
        assert_eq!(stay.postal_code.as_deref(), Some("101"));
        assert_eq!(stay.country.as_deref(), Some("DE"));
        assert!(stay.facility_reference().is_none());
        assert!(stay.extension.is_empty());
    }

    #[test]
    fn unknown_keys_report_their_path() {
        let err = NotificationCase::from_yaml_str(
            "notifier:\n  organization:\n    id: o1\n    colour: blue\n",
        )
        .expect_err("unknown key");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("notifier.organization")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn notifier_needs_exactly_one_target() {
        let mut case = case();
        case.notifier.practitioner = Some(PractitionerInput::default());
        let err = case
            .assemble(
                IdentifiabilityTier::ByName,
                &generators(),
                &AssemblerConfig::default(),
            )
            .expect_err("both targets");
        match err {
            FhirError::InvalidInputData(msg) => assert!(msg.contains("not both")),
            other => panic!("expected InvalidInputData error, got {other:?}"),
        }
    }

    #[test]
    fn partial_facility_is_rejected() {
        let mut case = case();
        if let Some(person) = case.notified_person.as_mut() {
            person.facility = Some(FacilityInput {
                name: Some("Charité".into()),
                ..FacilityInput::default()
            });
        }
        let err = case
            .redacted_person(IdentifiabilityTier::ByName, &generators())
            .expect_err("partial facility");
        match err {
            FhirError::InvalidInputData(msg) => assert!(msg.contains("postal_code")),
            other => panic!("expected InvalidInputData error, got {other:?}"),
        }
    }

    #[test]
    fn bad_birth_date_is_a_temporal_error() {
        let mut case = case();
        if let Some(person) = case.notified_person.as_mut() {
            person.birth_date = Some("10/10/1975".into());
        }
        let err = case
            .redacted_person(IdentifiabilityTier::ByName, &generators())
            .expect_err("bad date");
        match err {
            FhirError::InvalidTemporal(msg) => assert!(msg.contains("10/10/1975")),
            other => panic!("expected InvalidTemporal error, got {other:?}"),
        }
    }

    #[test]
    fn answers_need_exactly_one_value() {
        let answer = AnswerInput {
            string: Some("a".into()),
            boolean: Some(true),
            ..AnswerInput::default()
        };
        assert!(matches!(
            answer_value(&answer, "q"),
            Err(FhirError::InvalidInputData(_))
        ));
        assert!(matches!(
            answer_value(&AnswerInput::default(), "q"),
            Err(FhirError::InvalidInputData(_))
        ));
    }

    #[test]
    fn extra_resources_are_appended() {
        let mut case = case();
        case.extra_resources = vec![serde_yaml::from_str(
            "resourceType: Organization\nid: extra\nname: Gesundheitsamt",
        )
        .unwrap()];
        let bundle = case
            .assemble(
                IdentifiabilityTier::Anonymous,
                &generators(),
                &AssemblerConfig::default(),
            )
            .unwrap();
        assert_eq!(
            bundle.entries().last().map(|e| e.resource.id()),
            Some("extra")
        );
    }
}
