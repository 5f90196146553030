//! Reference resolution.
//!
//! Two sibling rules live here and must not be mixed up:
//! - [`reference_id`] produces the short in-document form (`Organization/o1`) used inside
//!   `Reference.reference`.
//! - [`full_url`] produces the absolute form (`https://demis.rki.de/fhir/Organization/o1`)
//!   used for `Bundle.entry.fullUrl`.
//!
//! Both return `urn:uuid:` ids verbatim: such an id is already globally unique and is never
//! rewritten.

use crate::resource::{DomainResource, Resource};
use crate::{FhirError, FhirResult};
use notify_uuid::URN_UUID_PREFIX;
use serde::{Deserialize, Serialize};

/// A pointer to another resource.
///
/// `reference` is the textual pointer that gets serialized. `resolved` optionally carries an
/// owned copy of the target so assembly and redaction can inspect it without a lookup table.
/// The copy is never serialized, and cloning a `Reference` clones the target by value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(skip)]
    resolved: Option<Box<Resource>>,
}

impl Reference {
    /// A reference to `resource` that also carries a copy of it.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidReference`] if the resource has no usable id.
    pub fn to<R>(resource: &R) -> FhirResult<Self>
    where
        R: DomainResource + Clone + Into<Resource>,
    {
        let reference = reference_id(resource)?;
        Ok(Self {
            reference: Some(reference),
            display: None,
            resolved: Some(Box::new(resource.clone().into())),
        })
    }

    /// A textual reference to `resource` without the in-memory copy.
    pub fn local<R>(resource: &R) -> FhirResult<Self>
    where
        R: DomainResource + ?Sized,
    {
        Ok(Self::from_text(reference_id(resource)?))
    }

    /// A reference known only by its text.
    pub fn from_text(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            display: None,
            resolved: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// The in-memory target, if this reference was created from a resource.
    pub fn resolved(&self) -> Option<&Resource> {
        self.resolved.as_deref()
    }
}

/// Type and bare id extracted from a possibly typed id such as
/// `https://host/fhir/Organization/o1/_history/2`.
#[derive(Debug, PartialEq, Eq)]
struct IdElement<'a> {
    resource_type: Option<&'a str>,
    id_part: &'a str,
}

impl<'a> IdElement<'a> {
    fn parse(id: &'a str) -> Self {
        let mut segments: Vec<&str> = id.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() >= 4 && segments[segments.len() - 2] == "_history" {
            segments.truncate(segments.len() - 2);
        }

        let id_part = segments.last().copied().unwrap_or("");
        let resource_type = segments
            .len()
            .checked_sub(2)
            .map(|i| segments[i])
            .filter(|t| t.starts_with(|c: char| c.is_ascii_uppercase()));

        Self {
            resource_type,
            id_part,
        }
    }
}

/// Validates the id and splits it into `(type, idPart)`.
fn typed_parts<R>(resource: &R) -> FhirResult<(String, String)>
where
    R: DomainResource + ?Sized,
{
    let id = resource.id().trim();
    let element = IdElement::parse(id);
    if element.id_part.is_empty() {
        return Err(FhirError::InvalidReference(format!(
            "Resource does not have a valid id ({})",
            resource.resource_type()
        )));
    }

    let resource_type = element
        .resource_type
        .map(str::to_string)
        .unwrap_or_else(|| resource.resource_type().to_string());
    Ok((resource_type, element.id_part.to_string()))
}

/// Canonical in-document reference: `urn:uuid:...` verbatim, otherwise `Type/idPart`.
///
/// # Errors
///
/// Returns [`FhirError::InvalidReference`] if the id is missing or empty.
pub fn reference_id<R>(resource: &R) -> FhirResult<String>
where
    R: DomainResource + ?Sized,
{
    let id = resource.id().trim();
    if id.starts_with(URN_UUID_PREFIX) {
        return Ok(id.to_string());
    }
    let (resource_type, id_part) = typed_parts(resource)?;
    Ok(format!("{resource_type}/{id_part}"))
}

/// Absolute entry `fullUrl`: `urn:uuid:...` verbatim, otherwise `base/Type/idPart`.
///
/// # Errors
///
/// Returns [`FhirError::InvalidReference`] if the id is missing or empty.
pub fn full_url<R>(resource: &R, base: &str) -> FhirResult<String>
where
    R: DomainResource + ?Sized,
{
    let id = resource.id().trim();
    if id.starts_with(URN_UUID_PREFIX) {
        return Ok(id.to_string());
    }
    let (resource_type, id_part) = typed_parts(resource)?;
    Ok(format!(
        "{}/{resource_type}/{id_part}",
        base.trim_end_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organization::Organization;
    use crate::patient::Patient;

    fn organization(id: &str) -> Organization {
        Organization {
            id: id.to_string(),
            ..Organization::default()
        }
    }

    #[test]
    fn urn_uuid_is_returned_verbatim() {
        let org = organization("urn:uuid:550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(
            reference_id(&org).unwrap(),
            "urn:uuid:550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(
            full_url(&org, "https://example.org/fhir").unwrap(),
            "urn:uuid:550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn bare_id_uses_declared_type() {
        assert_eq!(reference_id(&organization("o1")).unwrap(), "Organization/o1");

        let patient = Patient {
            id: "p-7".into(),
            ..Patient::default()
        };
        assert_eq!(reference_id(&patient).unwrap(), "Patient/p-7");
    }

    #[test]
    fn typed_id_element_takes_precedence() {
        let org = organization("Practitioner/x1");
        assert_eq!(reference_id(&org).unwrap(), "Practitioner/x1");
    }

    #[test]
    fn absolute_and_versioned_ids_are_stripped() {
        let org = organization("https://other.example/fhir/Organization/o1/_history/3");
        assert_eq!(reference_id(&org).unwrap(), "Organization/o1");
    }

    #[test]
    fn full_url_is_absolute_and_distinct_from_reference() {
        let org = organization("o1");
        let url = full_url(&org, "https://demis.rki.de/fhir/").unwrap();

        assert_eq!(url, "https://demis.rki.de/fhir/Organization/o1");
        assert_ne!(url, reference_id(&org).unwrap());
    }

    #[test]
    fn empty_id_is_rejected() {
        for id in ["", "   ", "/"] {
            let err = reference_id(&organization(id)).expect_err("empty id must fail");
            match err {
                FhirError::InvalidReference(msg) => {
                    assert!(msg.contains("Resource does not have a valid id"));
                }
                other => panic!("expected InvalidReference error, got {other:?}"),
            }
        }
    }

    #[test]
    fn reference_to_carries_an_owned_copy() {
        let org = organization("o1");
        let reference = Reference::to(&org).unwrap();

        assert_eq!(reference.reference(), Some("Organization/o1"));
        assert_eq!(reference.resolved(), Some(&Resource::Organization(org)));
    }

    #[test]
    fn resolved_copy_is_not_serialized() {
        let reference = Reference::to(&organization("o1")).unwrap();
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json, serde_json::json!({ "reference": "Organization/o1" }));
    }

    #[test]
    fn id_element_parsing() {
        assert_eq!(
            IdElement::parse("o1"),
            IdElement {
                resource_type: None,
                id_part: "o1"
            }
        );
        assert_eq!(
            IdElement::parse("Organization/o1"),
            IdElement {
                resource_type: Some("Organization"),
                id_part: "o1"
            }
        );
        assert_eq!(IdElement::parse("").id_part, "");
    }
}
