//! The Composition: the document-defining first entry of a notification bundle.

use crate::constants::{
    CODE_SYSTEM_LOINC, CODE_SYSTEM_NOTIFICATION_TYPE, CODE_SYSTEM_SECTION_CODE,
    LOINC_NOTIFICATION_FORM, NAMING_SYSTEM_NOTIFICATION_ID, NOTIFICATION_TYPE_DISEASE,
    PROFILE_NOTIFICATION_DISEASE, SECTION_CODE_DISEASE_COMMON,
};
use crate::datatypes::{CodeableConcept, Coding, Identifier, Meta};
use crate::questionnaire::QuestionnaireResponse;
use crate::reference::Reference;
use crate::FhirResult;
use chrono::{DateTime, Utc};
use notify_uuid::Generators;
use serde::{Deserialize, Serialize};

const DEFAULT_TITLE: &str = "Meldung gemäß §6 Absatz 1, 2 IfSG";

/// Workflow status of a composition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionStatus {
    Preliminary,
    #[default]
    Final,
    Amended,
    EnteredInError,
}

impl CompositionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "preliminary" => Some(CompositionStatus::Preliminary),
            "final" => Some(CompositionStatus::Final),
            "amended" => Some(CompositionStatus::Amended),
            "entered-in-error" => Some(CompositionStatus::EnteredInError),
            _ => None,
        }
    }
}

/// A section grouping references to clinical content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<Reference>,
}

impl CompositionSection {
    /// The common disease-information section pointing at the given responses.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError::InvalidReference`] if a response has no id.
    pub fn disease_information(responses: &[QuestionnaireResponse]) -> FhirResult<Self> {
        let entry = responses
            .iter()
            .map(Reference::local)
            .collect::<FhirResult<Vec<_>>>()?;
        Ok(Self {
            title: Some("disease information common".into()),
            code: Some(
                Coding::new(CODE_SYSTEM_SECTION_CODE, SECTION_CODE_DISEASE_COMMON).into(),
            ),
            entry,
        })
    }
}

/// Composition resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(default)]
    pub status: CompositionStatus,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<CompositionSection>,
}

/// Draft for a [`Composition`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositionBuilder {
    id: Option<String>,
    profile: Option<String>,
    identifier_value: Option<String>,
    status: Option<CompositionStatus>,
    type_coding: Option<Coding>,
    category_coding: Option<Coding>,
    title: Option<String>,
    date: Option<DateTime<Utc>>,
    author: Option<Reference>,
    subject: Option<Reference>,
    sections: Vec<CompositionSection>,
}

impl CompositionBuilder {
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

    /// Notification id. The naming system is fixed.
    pub fn identifier(mut self, value: impl Into<String>) -> Self {
        self.identifier_value = Some(value.into());
        self
    }

    pub fn status(mut self, status: CompositionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn type_coding(mut self, coding: Coding) -> Self {
        self.type_coding = Some(coding);
        self
    }

    pub fn category_coding(mut self, coding: Coding) -> Self {
        self.category_coding = Some(coding);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn author(mut self, author: Reference) -> Self {
        self.author = Some(author);
        self
    }

    pub fn subject(mut self, subject: Reference) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn section(mut self, section: CompositionSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Fills id, identifier, date, status, profile, type, category and title if unset.
    pub fn set_defaults(mut self, generators: &Generators) -> Self {
        if self.id.is_none() {
            self.id = Some(generators.next_id().to_string());
        }
        if self.identifier_value.is_none() {
            self.identifier_value = Some(generators.next_id().to_string());
        }
        if self.date.is_none() {
            self.date = Some(generators.now());
        }
        if self.status.is_none() {
            self.status = Some(CompositionStatus::Final);
        }
        if self.profile.is_none() {
            self.profile = Some(PROFILE_NOTIFICATION_DISEASE.to_string());
        }
        if self.type_coding.is_none() {
            self.type_coding = Some(Coding::new(CODE_SYSTEM_LOINC, LOINC_NOTIFICATION_FORM));
        }
        if self.category_coding.is_none() {
            self.category_coding = Some(Coding::new(
                CODE_SYSTEM_NOTIFICATION_TYPE,
                NOTIFICATION_TYPE_DISEASE,
            ));
        }
        if self.title.is_none() {
            self.title = Some(DEFAULT_TITLE.to_string());
        }
        self
    }

    pub fn build(&self) -> Composition {
        Composition {
            id: self.id.clone().unwrap_or_default(),
            meta: self
                .profile
                .as_ref()
                .map(|p| Meta::with_profile(p.clone()))
                .unwrap_or_default(),
            identifier: self
                .identifier_value
                .as_ref()
                .map(|v| Identifier::new(NAMING_SYSTEM_NOTIFICATION_ID, v.clone())),
            status: self.status.unwrap_or_default(),
            type_: self.type_coding.clone().map(CodeableConcept::from),
            category: self
                .category_coding
                .iter()
                .cloned()
                .map(CodeableConcept::from)
                .collect(),
            subject: self.subject.clone(),
            date: self.date,
            author: self.author.iter().cloned().collect(),
            title: self.title.clone(),
            section: self.sections.clone(),
        }
    }
}
