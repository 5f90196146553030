//! Shared FHIR data types: codings, identifiers, contact points, metadata and extensions.
//!
//! Extensions carry a polymorphic value. In the wire format this is one of several
//! `valueX` keys; in memory it is the [`ExtensionValue`] sum type, so "exactly one value" is
//! enforced by the type rather than by convention. Translation between the two happens in
//! [`ExtensionWire`].

use crate::reference::Reference;
use crate::temporal::FhirDate;
use crate::FhirError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Primitive helpers
// ============================================================================

/// Coded value from a code system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// True if this coding is `code` from `system`.
    pub fn is(&self, system: &str, code: &str) -> bool {
        self.system.as_deref() == Some(system) && self.code.as_deref() == Some(code)
    }
}

/// One or more codings plus free text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<Coding> for CodeableConcept {
    fn from(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            text: None,
        }
    }
}

/// Business identifier (system + value).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            value: Some(value.into()),
        }
    }
}

/// Telecommunication channel kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPointSystem {
    Phone,
    Fax,
    Email,
    Url,
    Other,
}

/// Purpose of a contact point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPointUse {
    Home,
    Work,
    Temp,
    Mobile,
}

/// Phone number, email address or similar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactPoint {
    pub system: ContactPointSystem,

    pub value: String,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<ContactPointUse>,
}

impl ContactPoint {
    pub fn new(system: ContactPointSystem, value: impl Into<String>) -> Self {
        Self {
            system,
            value: value.into(),
            use_type: None,
        }
    }

    pub fn phone(value: impl Into<String>) -> Self {
        Self::new(ContactPointSystem::Phone, value)
    }

    pub fn email(value: impl Into<String>) -> Self {
        Self::new(ContactPointSystem::Email, value)
    }

    pub fn with_use(mut self, use_type: ContactPointUse) -> Self {
        self.use_type = Some(use_type);
        self
    }
}

/// Resource metadata. Only the claimed profiles matter here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
}

impl Meta {
    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: vec![profile.into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }

    pub fn has_profile(&self, url: &str) -> bool {
        self.profile.iter().any(|p| p == url)
    }
}

/// Extension container for a primitive field (`_gender`, `_line`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Element {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl Element {
    pub fn is_empty(&self) -> bool {
        self.extension.is_empty()
    }
}

// ============================================================================
// Extensions
// ============================================================================

/// The single value an extension may carry.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionValue {
    String(String),
    Boolean(bool),
    Coding(Coding),
    Identifier(Identifier),
    Reference(Reference),
    Date(FhirDate),
    DateTime(DateTime<Utc>),
}

/// An extension: a URL plus either one value or nested extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExtensionWire", into = "ExtensionWire")]
pub struct Extension {
    pub url: String,
    pub value: Option<ExtensionValue>,
    pub extension: Vec<Extension>,
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            extension: Vec::new(),
        }
    }

    /// An extension made only of nested extensions.
    pub fn complex(url: impl Into<String>, extension: Vec<Extension>) -> Self {
        Self {
            url: url.into(),
            value: None,
            extension,
        }
    }

    pub fn value_coding(&self) -> Option<&Coding> {
        match &self.value {
            Some(ExtensionValue::Coding(coding)) => Some(coding),
            _ => None,
        }
    }

    pub fn value_reference(&self) -> Option<&Reference> {
        match &self.value {
            Some(ExtensionValue::Reference(reference)) => Some(reference),
            _ => None,
        }
    }

    pub fn value_string(&self) -> Option<&str> {
        match &self.value {
            Some(ExtensionValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Wire representation of an extension.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ExtensionWire {
    url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_boolean: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_coding: Option<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_date: Option<FhirDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_date_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extension: Vec<Extension>,
}

impl TryFrom<ExtensionWire> for Extension {
    type Error = FhirError;

    fn try_from(wire: ExtensionWire) -> Result<Self, Self::Error> {
        let mut values = [
            wire.value_string.map(ExtensionValue::String),
            wire.value_boolean.map(ExtensionValue::Boolean),
            wire.value_coding.map(ExtensionValue::Coding),
            wire.value_identifier.map(ExtensionValue::Identifier),
            wire.value_reference.map(ExtensionValue::Reference),
            wire.value_date.map(ExtensionValue::Date),
            wire.value_date_time.map(ExtensionValue::DateTime),
        ]
        .into_iter()
        .flatten();

        let value = values.next();
        if values.next().is_some() {
            return Err(FhirError::Translation(format!(
                "extension '{}' carries more than one value",
                wire.url
            )));
        }

        Ok(Self {
            url: wire.url,
            value,
            extension: wire.extension,
        })
    }
}

impl From<Extension> for ExtensionWire {
    fn from(ext: Extension) -> Self {
        let mut wire = ExtensionWire {
            url: ext.url,
            value_string: None,
            value_boolean: None,
            value_coding: None,
            value_identifier: None,
            value_reference: None,
            value_date: None,
            value_date_time: None,
            extension: ext.extension,
        };
        match ext.value {
            Some(ExtensionValue::String(v)) => wire.value_string = Some(v),
            Some(ExtensionValue::Boolean(v)) => wire.value_boolean = Some(v),
            Some(ExtensionValue::Coding(v)) => wire.value_coding = Some(v),
            Some(ExtensionValue::Identifier(v)) => wire.value_identifier = Some(v),
            Some(ExtensionValue::Reference(v)) => wire.value_reference = Some(v),
            Some(ExtensionValue::Date(v)) => wire.value_date = Some(v),
            Some(ExtensionValue::DateTime(v)) => wire.value_date_time = Some(v),
            None => {}
        }
        wire
    }
}
