//! Notification bundle assembly.
//!
//! Responsibilities:
//! - Order entries: Composition, notifier role, the role's target, notified person, then any
//!   further resources in insertion order
//! - Wire the Composition's author and subject to the role and person
//! - Compute entry `fullUrl`s from the configured base
//! - Fill bundle id, identifier, timestamp and profile
//!
//! Entries are neither reordered nor de-duplicated: passing the same organization twice yields
//! two entries.

use crate::composition::Composition;
use crate::config::AssemblerConfig;
use crate::constants::NAMING_SYSTEM_NOTIFICATION_BUNDLE_ID;
use crate::datatypes::{Identifier, Meta};
use crate::patient::Patient;
use crate::practitioner::PractitionerRole;
use crate::reference::{full_url, Reference};
use crate::resource::{DomainResource, Resource};
use crate::FhirResult;
use chrono::{DateTime, Utc};
use notify_uuid::Generators;
use serde::{Deserialize, Serialize};

/// Bundle type. Notifications are always documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    #[default]
    Document,
}

/// One bundle entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    pub resource: Resource,
}

/// A frozen notification bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType", rename = "Bundle")]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    meta: Meta,

    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<Identifier>,

    #[serde(rename = "type")]
    bundle_type: BundleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    entry: Vec<BundleEntry>,
}

impl Bundle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn bundle_type(&self) -> BundleType {
        self.bundle_type
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entry
    }

    /// The resources in entry order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().map(|e| &e.resource)
    }

    /// The Composition in entry 0.
    pub fn composition(&self) -> Option<&Composition> {
        match self.entry.first().map(|e| &e.resource) {
            Some(Resource::Composition(c)) => Some(c),
            _ => None,
        }
    }

    pub fn to_json_pretty(&self) -> FhirResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Assembler
// ============================================================================

/// Draft for a notification [`Bundle`].
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationBundleBuilder {
    config: AssemblerConfig,
    composition: Composition,
    notifier_role: Option<PractitionerRole>,
    notified_person: Option<Patient>,
    extra_entries: Vec<Resource>,
    bundle_id: Option<String>,
    identifier_value: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    profile: Option<String>,
}

impl NotificationBundleBuilder {
    pub fn new(composition: Composition, config: &AssemblerConfig) -> Self {
        Self {
            config: config.clone(),
            composition,
            notifier_role: None,
            notified_person: None,
            extra_entries: Vec::new(),
            bundle_id: None,
            identifier_value: None,
            timestamp: None,
            profile: None,
        }
    }

    pub fn notifier_role(mut self, role: PractitionerRole) -> Self {
        self.notifier_role = Some(role);
        self
    }

    pub fn notified_person(mut self, person: Patient) -> Self {
        self.notified_person = Some(person);
        self
    }

    /// Appends a resource after the role chain and the notified person.
    pub fn add_entry(mut self, resource: impl Into<Resource>) -> Self {
        self.extra_entries.push(resource.into());
        self
    }

    /// Appends a resource given as untyped JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError::UnsupportedResourceType`] if the value does not name a
    /// supported `resourceType`, or [`crate::FhirError::Translation`] if its shape is wrong.
    pub fn add_entry_value(self, value: serde_json::Value) -> FhirResult<Self> {
        let resource = Resource::from_value(value)?;
        Ok(self.add_entry(resource))
    }

    /// Appends a resource given as untyped YAML.
    ///
    /// # Errors
    ///
    /// As [`Self::add_entry_value`].
    pub fn add_entry_yaml(self, value: serde_yaml::Value) -> FhirResult<Self> {
        let json = serde_json::to_value(value)?;
        self.add_entry_value(json)
    }

    pub fn bundle_id(mut self, id: impl Into<String>) -> Self {
        self.bundle_id = Some(id.into());
        self
    }

    /// Bundle identifier value. The naming system is fixed.
    pub fn identifier(mut self, value: impl Into<String>) -> Self {
        self.identifier_value = Some(value.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Fills bundle id, identifier, timestamp and profile if they are unset.
    pub fn set_defaults(mut self, generators: &Generators) -> Self {
        if self.bundle_id.is_none() {
            self.bundle_id = Some(generators.next_id().to_string());
        }
        if self.identifier_value.is_none() {
            self.identifier_value = Some(generators.next_id().to_string());
        }
        if self.timestamp.is_none() {
            self.timestamp = Some(generators.now());
        }
        if self.profile.is_none() {
            self.profile = Some(self.config.bundle_profile().to_string());
        }
        self
    }

    /// Assembles the bundle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError::InvalidReference`] if the role or the notified person must be
    /// referenced from the Composition but has no id.
    pub fn build(&self) -> FhirResult<Bundle> {
        let mut composition = self.composition.clone();
        if let Some(role) = &self.notifier_role {
            if composition.author.is_empty() {
                composition.author.push(Reference::local(role)?);
            }
        }
        if let Some(person) = &self.notified_person {
            if composition.subject.is_none() {
                composition.subject = Some(Reference::local(person)?);
            }
        }

        let mut resources: Vec<Resource> = vec![composition.into()];
        if let Some(role) = &self.notifier_role {
            resources.push(role.clone().into());
            if let Some(practitioner) = role.resolved_practitioner() {
                resources.push(practitioner.clone().into());
            } else if let Some(organization) = role.resolved_organization() {
                resources.push(organization.clone().into());
            } else {
                tracing::warn!(
                    role_id = %role.id,
                    "notifier role target is not resolvable; not adding it to the bundle"
                );
            }
        }
        if let Some(person) = &self.notified_person {
            resources.push(person.clone().into());
        }
        resources.extend(self.extra_entries.iter().cloned());

        let entry = resources
            .into_iter()
            .map(|resource| self.entry_for(resource))
            .collect::<FhirResult<Vec<_>>>()?;

        tracing::debug!(
            bundle_id = self.bundle_id.as_deref().unwrap_or(""),
            entries = entry.len(),
            "assembled notification bundle"
        );

        Ok(Bundle {
            id: self.bundle_id.clone().unwrap_or_default(),
            meta: self
                .profile
                .as_ref()
                .map(|p| Meta::with_profile(p.clone()))
                .unwrap_or_default(),
            identifier: self
                .identifier_value
                .as_ref()
                .map(|v| Identifier::new(NAMING_SYSTEM_NOTIFICATION_BUNDLE_ID, v.clone())),
            bundle_type: BundleType::Document,
            timestamp: self.timestamp,
            entry,
        })
    }

    fn entry_for(&self, resource: Resource) -> FhirResult<BundleEntry> {
        let full_url = if resource.id().trim().is_empty() {
            None
        } else {
            Some(full_url(&resource, self.config.full_url_base())?)
        };
        Ok(BundleEntry { full_url, resource })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::CompositionBuilder;
    use crate::organization::{Organization, OrganizationBuilder};
    use crate::patient::PatientBuilder;
    use crate::practitioner::{PractitionerBuilder, PractitionerRoleBuilder};
    use crate::questionnaire::{AnswerValue, QuestionnaireItemBuilder, QuestionnaireResponseBuilder};
    use crate::resource::ResourceType;
    use crate::FhirError;
    use notify_uuid::{FixedClock, SequentialIdGenerator};
    use serde_json::json;

    fn generators() -> Generators {
        Generators::new(
            SequentialIdGenerator::new(),
            FixedClock::parse("2024-03-01T10:00:00Z").unwrap(),
        )
    }

    fn composition(id: &str) -> Composition {
        CompositionBuilder::new().id(id).build()
    }

    fn organization(id: &str) -> Organization {
        OrganizationBuilder::notifier_facility().id(id).build()
    }

    fn types(bundle: &Bundle) -> Vec<ResourceType> {
        bundle.resources().map(|r| r.resource_type()).collect()
    }

    #[test]
    fn composition_role_and_organization_in_order() {
        let g = generators();
        let role = PractitionerRoleBuilder::new()
            .organization(organization("o1"))
            .set_defaults(&g)
            .build()
            .unwrap();

        let bundle = NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default())
            .notifier_role(role.clone())
            .set_defaults(&g)
            .build()
            .expect("bundle");

        assert_eq!(
            types(&bundle),
            vec![
                ResourceType::Composition,
                ResourceType::PractitionerRole,
                ResourceType::Organization
            ]
        );
        let entries = bundle.entries();
        assert_eq!(entries[0].resource.id(), "c1");
        assert_eq!(entries[1].resource.id(), "00000000-0000-0000-0000-000000000001");
        assert_eq!(entries[2].resource.id(), "o1");
        assert_eq!(
            entries[2].full_url.as_deref(),
            Some("https://demis.rki.de/fhir/Organization/o1")
        );
        assert_eq!(
            entries[1].full_url.as_deref(),
            Some("https://demis.rki.de/fhir/PractitionerRole/00000000-0000-0000-0000-000000000001")
        );
        assert_eq!(
            bundle.composition().unwrap().author[0].reference(),
            Some(format!("PractitionerRole/{}", role.id).as_str())
        );
    }

    #[test]
    fn role_expands_to_practitioner() {
        let g = generators();
        let role = PractitionerRoleBuilder::new()
            .practitioner(PractitionerBuilder::new().set_defaults(&g).build())
            .set_defaults(&g)
            .build()
            .unwrap();

        let bundle = NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default())
            .notifier_role(role)
            .build()
            .unwrap();

        assert_eq!(
            types(&bundle),
            vec![
                ResourceType::Composition,
                ResourceType::PractitionerRole,
                ResourceType::Practitioner
            ]
        );
    }

    #[test]
    fn person_and_extras_follow_role_chain_and_duplicates_are_kept() {
        let g = generators();
        let person = PatientBuilder::new().id("p1").set_defaults(&g).build();
        let response = QuestionnaireResponseBuilder::new()
            .item(QuestionnaireItemBuilder::new("q").answer(AnswerValue::Boolean(true)))
            .set_defaults(&g)
            .build();
        let facility = organization("f1");
        let role = PractitionerRoleBuilder::new()
            .organization(organization("o1"))
            .id("r1")
            .build()
            .unwrap();

        let bundle = NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default())
            .add_entry(facility.clone())
            .notified_person(person)
            .add_entry(response)
            .add_entry(facility)
            .notifier_role(role)
            .build()
            .unwrap();

        assert_eq!(
            types(&bundle),
            vec![
                ResourceType::Composition,
                ResourceType::PractitionerRole,
                ResourceType::Organization,
                ResourceType::Patient,
                ResourceType::Organization,
                ResourceType::QuestionnaireResponse,
                ResourceType::Organization,
            ]
        );
        assert_eq!(
            bundle.composition().unwrap().subject.as_ref().and_then(Reference::reference),
            Some("Patient/p1")
        );
    }

    #[test]
    fn existing_author_and_subject_are_kept() {
        let c = CompositionBuilder::new()
            .id("c1")
            .author(Reference::from_text("PractitionerRole/other"))
            .subject(Reference::from_text("Patient/other"))
            .build();
        let role = PractitionerRoleBuilder::new()
            .id("r1")
            .organization(organization("o1"))
            .build()
            .unwrap();

        let bundle = NotificationBundleBuilder::new(c, &AssemblerConfig::default())
            .notifier_role(role)
            .notified_person(PatientBuilder::new().id("p1").build())
            .build()
            .unwrap();

        let composition = bundle.composition().unwrap();
        assert_eq!(composition.author.len(), 1);
        assert_eq!(composition.author[0].reference(), Some("PractitionerRole/other"));
        assert_eq!(
            composition.subject.as_ref().and_then(Reference::reference),
            Some("Patient/other")
        );
    }

    #[test]
    fn person_without_id_cannot_become_subject() {
        let err = NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default())
            .notified_person(PatientBuilder::new().build())
            .build()
            .expect_err("subject needs an id");
        match err {
            FhirError::InvalidReference(msg) => assert!(msg.contains("Patient")),
            other => panic!("expected InvalidReference error, got {other:?}"),
        }
    }

    #[test]
    fn entries_without_id_have_no_full_url() {
        let bundle = NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default())
            .add_entry(Organization::default())
            .build()
            .unwrap();

        assert_eq!(bundle.entries()[1].full_url, None);
        assert!(bundle.entries()[0].full_url.is_some());
    }

    #[test]
    fn urn_uuid_ids_are_used_as_full_url() {
        let id = "urn:uuid:550e8400-e29b-41d4-a716-446655440000";
        let bundle = NotificationBundleBuilder::new(composition(id), &AssemblerConfig::default())
            .build()
            .unwrap();
        assert_eq!(bundle.entries()[0].full_url.as_deref(), Some(id));
    }

    #[test]
    fn untyped_entries_are_validated() {
        let builder =
            NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default());

        let err = builder
            .clone()
            .add_entry_value(json!({ "resourceType": "Observation", "id": "x" }))
            .expect_err("Observation is not supported");
        match err {
            FhirError::UnsupportedResourceType(name) => assert_eq!(name, "Observation"),
            other => panic!("expected UnsupportedResourceType error, got {other:?}"),
        }

        let yaml: serde_yaml::Value =
            serde_yaml::from_str("resourceType: Organization\nid: o9\nname: Labor").unwrap();
        let bundle = builder.add_entry_yaml(yaml).unwrap().build().unwrap();
        assert_eq!(bundle.entries()[1].resource.id(), "o9");
    }

    #[test]
    fn set_defaults_fills_metadata_once() {
        let g = generators();
        let once = NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default())
            .bundle_id("b1")
            .set_defaults(&g);
        let twice = once.clone().set_defaults(&g);
        assert_eq!(once, twice);

        let bundle = twice.build().unwrap();
        assert_eq!(bundle.id(), "b1");
        assert_eq!(
            bundle.identifier(),
            Some(&Identifier::new(
                NAMING_SYSTEM_NOTIFICATION_BUNDLE_ID,
                "00000000-0000-0000-0000-000000000001"
            ))
        );
        assert_eq!(bundle.bundle_type(), BundleType::Document);
        assert!(bundle
            .meta()
            .has_profile(AssemblerConfig::default().bundle_profile()));
        assert_eq!(
            bundle.timestamp().map(|t| t.to_rfc3339()),
            Some("2024-03-01T10:00:00+00:00".to_string())
        );
    }

    #[test]
    fn configured_base_is_used_for_full_urls() {
        let config = AssemblerConfig::new("https://fhir.example.org/base/", "urn:profile").unwrap();
        let bundle = NotificationBundleBuilder::new(composition("c1"), &config)
            .set_defaults(&generators())
            .build()
            .unwrap();

        assert_eq!(
            bundle.entries()[0].full_url.as_deref(),
            Some("https://fhir.example.org/base/Composition/c1")
        );
        assert!(bundle.meta().has_profile("urn:profile"));
    }

    #[test]
    fn serializes_as_fhir_document() {
        let bundle = NotificationBundleBuilder::new(composition("c1"), &AssemblerConfig::default())
            .bundle_id("b1")
            .build()
            .unwrap();
        let json = serde_json::to_value(&bundle).unwrap();

        assert_eq!(json["resourceType"], "Bundle");
        assert_eq!(json["type"], "document");
        assert_eq!(json["entry"][0]["resource"]["resourceType"], "Composition");
        assert_eq!(
            json["entry"][0]["fullUrl"],
            "https://demis.rki.de/fhir/Composition/c1"
        );

        let back: Bundle = serde_json::from_value(json).unwrap();
        assert_eq!(back.entries().len(), 1);
    }
}
