//! Organizations: notifier facilities and the facilities a notified person is staying at.

use crate::address::{Address, AddressBuilder};
use crate::constants::{PROFILE_NOTIFIED_PERSON_FACILITY, PROFILE_NOTIFIER_FACILITY};
use crate::datatypes::{CodeableConcept, Coding, ContactPoint, Extension, Identifier, Meta};
use crate::human_name::HumanName;
use crate::{FhirError, FhirResult};
use notify_types::NonEmptyText;
use notify_uuid::Generators;
use serde::{Deserialize, Serialize};

/// Contact person at an organization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

/// Organization resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub type_: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<OrganizationContact>,
}

/// Draft for an [`Organization`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrganizationBuilder {
    id: Option<String>,
    profile: Option<String>,
    default_profile: Option<&'static str>,
    name: Option<String>,
    identifiers: Vec<Identifier>,
    type_codings: Vec<Coding>,
    telecom: Vec<ContactPoint>,
    address: Option<Address>,
    contact: Option<OrganizationContact>,
}

impl OrganizationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder tagged with the notifier facility profile unless [`Self::profile`] overrides it.
    pub fn notifier_facility() -> Self {
        Self {
            default_profile: Some(PROFILE_NOTIFIER_FACILITY),
            ..Self::default()
        }
    }

    /// A builder tagged with the notified-person facility profile unless [`Self::profile`]
    /// overrides it.
    pub fn notified_person_facility() -> Self {
        Self {
            default_profile: Some(PROFILE_NOTIFIED_PERSON_FACILITY),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifiers.push(identifier);
        self
    }

    pub fn type_coding(mut self, coding: Coding) -> Self {
        self.type_codings.push(coding);
        self
    }

    pub fn telecom(mut self, contact: ContactPoint) -> Self {
        self.telecom.push(contact);
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn contact_person(mut self, name: HumanName) -> Self {
        self.contact = Some(OrganizationContact {
            name: Some(name),
            telecom: Vec::new(),
        });
        self
    }

    /// Fills id and profile if they are unset.
    pub fn set_defaults(mut self, generators: &Generators) -> Self {
        if self.id.is_none() {
            self.id = Some(generators.next_id().to_string());
        }
        if self.profile.is_none() {
            self.profile = self.default_profile.map(str::to_string);
        }
        self
    }

    /// Builds the organization. An unset profile falls back to the constructor's default, with
    /// or without [`Self::set_defaults`].
    pub fn build(&self) -> Organization {
        Organization {
            id: self.id.clone().unwrap_or_default(),
            meta: self
                .profile
                .as_deref()
                .or(self.default_profile)
                .map(Meta::with_profile)
                .unwrap_or_default(),
            extension: Vec::new(),
            identifier: self.identifiers.clone(),
            type_: self
                .type_codings
                .iter()
                .cloned()
                .map(CodeableConcept::from)
                .collect(),
            name: self.name.clone(),
            telecom: self.telecom.clone(),
            address: self.address.iter().cloned().collect(),
            contact: self.contact.iter().cloned().collect(),
        }
    }
}

/// Form-style data describing the facility a notified person is staying at.
///
/// Either nothing is filled in, or at least `name`, `postal_code`, `city` and `country` are.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilityInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl FacilityInput {
    fn fields(&self) -> [(&'static str, Option<&str>, bool); 8] {
        [
            ("name", self.name.as_deref(), true),
            ("street", self.street.as_deref(), false),
            ("house_number", self.house_number.as_deref(), false),
            ("postal_code", self.postal_code.as_deref(), true),
            ("city", self.city.as_deref(), true),
            ("country", self.country.as_deref(), true),
            ("phone", self.phone.as_deref(), false),
            ("email", self.email.as_deref(), false),
        ]
    }

    /// True if no data field carries text. The id alone does not count.
    pub fn is_blank(&self) -> bool {
        self.fields()
            .iter()
            .all(|(_, value, _)| NonEmptyText::from_optional(*value).is_none())
    }

    /// Builds the notified-person-facility organization.
    ///
    /// # Returns
    ///
    /// `None` when the input is blank.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInputData`] naming every missing required field when the
    /// input is only partially filled in.
    pub fn to_organization(&self, generators: &Generators) -> FhirResult<Option<Organization>> {
        if self.is_blank() {
            return Ok(None);
        }

        let missing: Vec<&str> = self
            .fields()
            .iter()
            .filter(|(_, value, required)| {
                *required && NonEmptyText::from_optional(*value).is_none()
            })
            .map(|(field, _, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(FhirError::InvalidInputData(format!(
                "facility data is incomplete, missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut address = AddressBuilder::new();
        if let Some(street) = &self.street {
            address = address.street(street);
        }
        if let Some(number) = &self.house_number {
            address = address.house_number(number);
        }
        if let Some(postal_code) = &self.postal_code {
            address = address.postal_code(postal_code);
        }
        if let Some(city) = &self.city {
            address = address.city(city);
        }
        if let Some(country) = &self.country {
            address = address.country(country);
        }

        let mut builder = OrganizationBuilder::notified_person_facility().address(address.build());
        if let Some(id) = NonEmptyText::from_optional(self.id.as_deref()) {
            builder = builder.id(id);
        }
        if let Some(name) = NonEmptyText::from_optional(self.name.as_deref()) {
            builder = builder.name(name);
        }
        if let Some(phone) = NonEmptyText::from_optional(self.phone.as_deref()) {
            builder = builder.telecom(ContactPoint::phone(phone));
        }
        if let Some(email) = NonEmptyText::from_optional(self.email.as_deref()) {
            builder = builder.telecom(ContactPoint::email(email));
        }

        Ok(Some(builder.set_defaults(generators).build()))
    }
}
