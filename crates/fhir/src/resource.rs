//! The closed set of resources a notification bundle can contain.
//!
//! Every concrete resource struct implements [`DomainResource`], and [`Resource`] is the sum
//! type carried by bundle entries and resolved references. Untyped input (JSON or YAML values)
//! enters through [`Resource::from_value`], which is where unsupported resource types are
//! rejected.

use crate::composition::Composition;
use crate::datatypes::Meta;
use crate::organization::Organization;
use crate::patient::Patient;
use crate::practitioner::{Practitioner, PractitionerRole};
use crate::questionnaire::QuestionnaireResponse;
use crate::{FhirError, FhirResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported resource types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Composition,
    Patient,
    Practitioner,
    PractitionerRole,
    Organization,
    QuestionnaireResponse,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Composition,
        ResourceType::Patient,
        ResourceType::Practitioner,
        ResourceType::PractitionerRole,
        ResourceType::Organization,
        ResourceType::QuestionnaireResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Composition => "Composition",
            ResourceType::Patient => "Patient",
            ResourceType::Practitioner => "Practitioner",
            ResourceType::PractitionerRole => "PractitionerRole",
            ResourceType::Organization => "Organization",
            ResourceType::QuestionnaireResponse => "QuestionnaireResponse",
        }
    }

    /// Parses a `resourceType` value.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::UnsupportedResourceType`] for anything outside [`Self::ALL`].
    pub fn parse(s: &str) -> FhirResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FhirError::UnsupportedResourceType(s.to_string()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accessors shared by every resource.
pub trait DomainResource {
    fn resource_type(&self) -> ResourceType;

    /// Logical id; empty before one has been assigned.
    fn id(&self) -> &str;

    fn meta(&self) -> &Meta;

    fn has_profile(&self, url: &str) -> bool {
        self.meta().has_profile(url)
    }
}

macro_rules! domain_resource {
    ($($ty:ident),* $(,)?) => {
        $(
            impl DomainResource for $ty {
                fn resource_type(&self) -> ResourceType {
                    ResourceType::$ty
                }

                fn id(&self) -> &str {
                    &self.id
                }

                fn meta(&self) -> &Meta {
                    &self.meta
                }
            }

            impl From<$ty> for Resource {
                fn from(value: $ty) -> Self {
                    Resource::$ty(value)
                }
            }
        )*
    };
}

domain_resource!(
    Composition,
    Patient,
    Practitioner,
    PractitionerRole,
    Organization,
    QuestionnaireResponse,
);

/// Any supported resource, tagged by `resourceType` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Composition(Composition),
    Patient(Patient),
    Practitioner(Practitioner),
    PractitionerRole(PractitionerRole),
    Organization(Organization),
    QuestionnaireResponse(QuestionnaireResponse),
}

impl Resource {
    fn inner(&self) -> &dyn DomainResource {
        match self {
            Resource::Composition(r) => r,
            Resource::Patient(r) => r,
            Resource::Practitioner(r) => r,
            Resource::PractitionerRole(r) => r,
            Resource::Organization(r) => r,
            Resource::QuestionnaireResponse(r) => r,
        }
    }

    /// Converts an untyped JSON value into a resource.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`FhirError::UnsupportedResourceType`] if the value is not an object with a supported
    ///   `resourceType`,
    /// - [`FhirError::Translation`] if the object does not match that resource's shape.
    pub fn from_value(value: serde_json::Value) -> FhirResult<Self> {
        let type_name = match value.get("resourceType") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => return Err(FhirError::UnsupportedResourceType(other.to_string())),
            None => {
                return Err(FhirError::UnsupportedResourceType(
                    "<missing resourceType>".into(),
                ))
            }
        };
        let resource = match ResourceType::parse(&type_name)? {
            ResourceType::Composition => Resource::Composition(deserialize_as(value, &type_name)?),
            ResourceType::Patient => Resource::Patient(deserialize_as(value, &type_name)?),
            ResourceType::Practitioner => {
                Resource::Practitioner(deserialize_as(value, &type_name)?)
            }
            ResourceType::PractitionerRole => {
                Resource::PractitionerRole(deserialize_as(value, &type_name)?)
            }
            ResourceType::Organization => {
                Resource::Organization(deserialize_as(value, &type_name)?)
            }
            ResourceType::QuestionnaireResponse => {
                Resource::QuestionnaireResponse(deserialize_as(value, &type_name)?)
            }
        };
        Ok(resource)
    }

    pub fn as_organization(&self) -> Option<&Organization> {
        match self {
            Resource::Organization(org) => Some(org),
            _ => None,
        }
    }

    pub fn as_practitioner(&self) -> Option<&Practitioner> {
        match self {
            Resource::Practitioner(p) => Some(p),
            _ => None,
        }
    }
}

/// Deserializes one concrete resource, reporting the failing path (e.g. `address.0.postalCode`).
fn deserialize_as<T>(value: serde_json::Value, type_name: &str) -> FhirResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() {
            "<root>"
        } else {
            path.as_str()
        };
        FhirError::Translation(format!("{type_name} schema mismatch at {path}: {source}"))
    })
}

impl DomainResource for Resource {
    fn resource_type(&self) -> ResourceType {
        self.inner().resource_type()
    }

    fn id(&self) -> &str {
        self.inner().id()
    }

    fn meta(&self) -> &Meta {
        self.inner().meta()
    }
}
