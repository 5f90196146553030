//! The notifier: a practitioner or facility acting through a PractitionerRole.

use crate::address::Address;
use crate::constants::{PROFILE_NOTIFIER, PROFILE_NOTIFIER_ROLE};
use crate::datatypes::{ContactPoint, Identifier, Meta};
use crate::human_name::HumanName;
use crate::organization::Organization;
use crate::reference::Reference;
use crate::{FhirError, FhirResult};
use notify_uuid::Generators;
use serde::{Deserialize, Serialize};

/// Practitioner resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Practitioner {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
}

/// PractitionerRole resource. Points at exactly one of practitioner or organization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PractitionerRole {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,
}

impl PractitionerRole {
    /// The in-memory practitioner this role points at, if any.
    pub fn resolved_practitioner(&self) -> Option<&Practitioner> {
        self.practitioner
            .as_ref()
            .and_then(Reference::resolved)
            .and_then(|r| r.as_practitioner())
    }

    /// The in-memory organization this role points at, if any.
    pub fn resolved_organization(&self) -> Option<&Organization> {
        self.organization
            .as_ref()
            .and_then(Reference::resolved)
            .and_then(|r| r.as_organization())
    }
}

/// Draft for a [`Practitioner`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PractitionerBuilder {
    id: Option<String>,
    profile: Option<String>,
    identifiers: Vec<Identifier>,
    name: Option<HumanName>,
    telecom: Vec<ContactPoint>,
    address: Option<Address>,
}

impl PractitionerBuilder {
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

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifiers.push(identifier);
        self
    }

    pub fn name(mut self, name: HumanName) -> Self {
        self.name = Some(name);
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

    /// Fills id and the notifier profile if they are unset.
    pub fn set_defaults(mut self, generators: &Generators) -> Self {
        if self.id.is_none() {
            self.id = Some(generators.next_id().to_string());
        }
        if self.profile.is_none() {
            self.profile = Some(PROFILE_NOTIFIER.to_string());
        }
        self
    }

    pub fn build(&self) -> Practitioner {
        Practitioner {
            id: self.id.clone().unwrap_or_default(),
            meta: self
                .profile
                .as_ref()
                .map(|p| Meta::with_profile(p.clone()))
                .unwrap_or_default(),
            identifier: self.identifiers.clone(),
            name: self.name.iter().cloned().collect(),
            telecom: self.telecom.clone(),
            address: self.address.iter().cloned().collect(),
        }
    }
}

/// Who a notifier role acts for.
#[derive(Clone, Debug, PartialEq)]
pub enum RoleTarget {
    Practitioner(Practitioner),
    Organization(Organization),
}

impl From<Practitioner> for RoleTarget {
    fn from(value: Practitioner) -> Self {
        RoleTarget::Practitioner(value)
    }
}

impl From<Organization> for RoleTarget {
    fn from(value: Organization) -> Self {
        RoleTarget::Organization(value)
    }
}

/// Draft for a [`PractitionerRole`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PractitionerRoleBuilder {
    id: Option<String>,
    profile: Option<String>,
    target: Option<RoleTarget>,
}

impl PractitionerRoleBuilder {
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

    /// Sets the practitioner or organization the role acts for, replacing any earlier target.
    pub fn target(mut self, target: impl Into<RoleTarget>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn practitioner(self, practitioner: Practitioner) -> Self {
        self.target(practitioner)
    }

    pub fn organization(self, organization: Organization) -> Self {
        self.target(organization)
    }

    /// Fills id and the notifier-role profile if they are unset.
    pub fn set_defaults(mut self, generators: &Generators) -> Self {
        if self.id.is_none() {
            self.id = Some(generators.next_id().to_string());
        }
        if self.profile.is_none() {
            self.profile = Some(PROFILE_NOTIFIER_ROLE.to_string());
        }
        self
    }

    /// Builds the role.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInputData`] if no target was set, or
    /// [`FhirError::InvalidReference`] if the target has no usable id.
    pub fn build(&self) -> FhirResult<PractitionerRole> {
        let (practitioner, organization) = match &self.target {
            Some(RoleTarget::Practitioner(p)) => (Some(Reference::to(p)?), None),
            Some(RoleTarget::Organization(o)) => (None, Some(Reference::to(o)?)),
            None => {
                return Err(FhirError::InvalidInputData(
                    "notifier role needs a practitioner or an organization".into(),
                ))
            }
        };

        Ok(PractitionerRole {
            id: self.id.clone().unwrap_or_default(),
            meta: self
                .profile
                .as_ref()
                .map(|p| Meta::with_profile(p.clone()))
                .unwrap_or_default(),
            practitioner,
            organization,
        })
    }
}
