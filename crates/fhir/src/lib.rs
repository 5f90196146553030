//! FHIR notification support: bundle assembly and privacy-graded redaction.
//!
//! This crate provides:
//! - the resource model for disease notifications (Composition, Patient, Practitioner,
//!   PractitionerRole, Organization, QuestionnaireResponse) and its FHIR JSON shape
//! - draft builders with fill-if-absent defaults
//! - reference resolution (`Type/id` and absolute `fullUrl`)
//! - the notification bundle assembler
//! - the redaction engine producing by-name, not-by-name, non-nominal and anonymous copies of
//!   the notified person
//! - YAML case files describing one notification
//!
//! This crate does NOT:
//! - validate against published StructureDefinitions
//! - transport or store documents
//!
//! Ids and timestamps come from an injected [`notify_uuid::Generators`], never from ambient
//! state, so tests substitute deterministic implementations.

pub mod address;
pub mod bundle;
pub mod case;
pub mod composition;
pub mod config;
pub mod constants;
pub mod datatypes;
pub mod human_name;
pub mod organization;
pub mod patient;
pub mod practitioner;
pub mod questionnaire;
pub mod redaction;
pub mod reference;
pub mod resource;
pub mod temporal;

// Re-export facades
pub use bundle::{Bundle, BundleEntry, BundleType, NotificationBundleBuilder};
pub use case::NotificationCase;
pub use config::AssemblerConfig;
pub use redaction::{IdentifiabilityTier, Redaction};
pub use reference::{full_url, reference_id, Reference};
pub use resource::{DomainResource, Resource, ResourceType};

// Re-export resources and their builders
pub use address::{Address, AddressBuilder, AddressUse};
pub use composition::{Composition, CompositionBuilder, CompositionSection, CompositionStatus};
pub use datatypes::{CodeableConcept, Coding, ContactPoint, Extension, ExtensionValue, Identifier};
pub use human_name::{HumanName, HumanNameBuilder, NameUse};
pub use organization::{FacilityInput, Organization, OrganizationBuilder};
pub use patient::{Gender, GenderAmtlich, Patient, PatientBuilder};
pub use practitioner::{
    Practitioner, PractitionerBuilder, PractitionerRole, PractitionerRoleBuilder, RoleTarget,
};
pub use questionnaire::{
    Answer, AnswerValue, QuestionnaireItem, QuestionnaireItemBuilder, QuestionnaireResponse,
    QuestionnaireResponseBuilder,
};
pub use temporal::{parse_date_time, DatePrecision, FhirDate};

/// Errors returned by the `notify-fhir` crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    #[error("invalid input data: {0}")]
    InvalidInputData(String),

    #[error("invalid date or time: {0}")]
    InvalidTemporal(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
