//! Questionnaire responses carrying the clinical part of a notification.
//!
//! Items nest in two ways: directly (`item.item`) and below an answer (`answer.item`). Items
//! without any answer and without nested content are dropped when building, so a form with
//! unanswered questions never produces empty items.

use crate::constants::PROFILE_DISEASE_QUESTIONNAIRE_RESPONSE;
use crate::datatypes::{Coding, Meta};
use crate::reference::Reference;
use crate::temporal::FhirDate;
use crate::FhirError;
use chrono::{DateTime, Utc};
use notify_types::NonEmptyText;
use notify_uuid::Generators;
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUESTIONNAIRE: &str =
    "https://demis.rki.de/fhir/Questionnaire/DiseaseQuestionsCommon";

/// Completion status of a questionnaire response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionnaireResponseStatus {
    InProgress,
    #[default]
    Completed,
    Amended,
    EnteredInError,
    Stopped,
}

/// The value of a single answer.
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Date(FhirDate),
    DateTime(DateTime<Utc>),
    Coding(Coding),
    Reference(Reference),
}

/// An answer, optionally followed by items that only apply given this answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnswerWire", into = "AnswerWire")]
pub struct Answer {
    pub value: AnswerValue,
    pub item: Vec<QuestionnaireItem>,
}

impl Answer {
    pub fn new(value: AnswerValue) -> Self {
        Self {
            value,
            item: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AnswerWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_boolean: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_integer: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_decimal: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_date: Option<FhirDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_date_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_coding: Option<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    value_reference: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    item: Vec<QuestionnaireItem>,
}

impl TryFrom<AnswerWire> for Answer {
    type Error = FhirError;

    fn try_from(wire: AnswerWire) -> Result<Self, Self::Error> {
        let mut values = [
            wire.value_string.map(AnswerValue::String),
            wire.value_boolean.map(AnswerValue::Boolean),
            wire.value_integer.map(AnswerValue::Integer),
            wire.value_decimal.map(AnswerValue::Decimal),
            wire.value_date.map(AnswerValue::Date),
            wire.value_date_time.map(AnswerValue::DateTime),
            wire.value_coding.map(AnswerValue::Coding),
            wire.value_reference.map(AnswerValue::Reference),
        ]
        .into_iter()
        .flatten();

        let value = values.next().ok_or_else(|| {
            FhirError::Translation("questionnaire answer carries no value".into())
        })?;
        if values.next().is_some() {
            return Err(FhirError::Translation(
                "questionnaire answer carries more than one value".into(),
            ));
        }

        Ok(Self {
            value,
            item: wire.item,
        })
    }
}

impl From<Answer> for AnswerWire {
    fn from(answer: Answer) -> Self {
        let mut wire = AnswerWire {
            value_string: None,
            value_boolean: None,
            value_integer: None,
            value_decimal: None,
            value_date: None,
            value_date_time: None,
            value_coding: None,
            value_reference: None,
            item: answer.item,
        };
        match answer.value {
            AnswerValue::String(v) => wire.value_string = Some(v),
            AnswerValue::Boolean(v) => wire.value_boolean = Some(v),
            AnswerValue::Integer(v) => wire.value_integer = Some(v),
            AnswerValue::Decimal(v) => wire.value_decimal = Some(v),
            AnswerValue::Date(v) => wire.value_date = Some(v),
            AnswerValue::DateTime(v) => wire.value_date_time = Some(v),
            AnswerValue::Coding(v) => wire.value_coding = Some(v),
            AnswerValue::Reference(v) => wire.value_reference = Some(v),
        }
        wire
    }
}

/// One question with its answers and nested questions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuestionnaireItem {
    pub link_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answer: Vec<Answer>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<QuestionnaireItem>,
}

/// QuestionnaireResponse resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub questionnaire: Option<String>,

    #[serde(default)]
    pub status: QuestionnaireResponseStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<QuestionnaireItem>,
}

/// Draft for a [`QuestionnaireItem`].
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionnaireItemBuilder {
    link_id: String,
    text: Option<String>,
    answers: Vec<Answer>,
    items: Vec<QuestionnaireItem>,
}

impl QuestionnaireItemBuilder {
    pub fn new(link_id: impl Into<String>) -> Self {
        Self {
            link_id: link_id.into(),
            text: None,
            answers: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn answer(mut self, value: AnswerValue) -> Self {
        self.answers.push(Answer::new(value));
        self
    }

    /// Adds an answer whose follow-up items are built from `items`. Empty follow-ups are dropped.
    pub fn answer_with_items(
        mut self,
        value: AnswerValue,
        items: impl IntoIterator<Item = QuestionnaireItemBuilder>,
    ) -> Self {
        self.answers.push(Answer {
            value,
            item: items.into_iter().filter_map(|b| b.build()).collect(),
        });
        self
    }

    /// Nests an item directly below this one. An empty nested item is dropped.
    pub fn item(mut self, item: QuestionnaireItemBuilder) -> Self {
        if let Some(item) = item.build() {
            self.items.push(item);
        }
        self
    }

    /// Builds the item, or `None` if it has no link id or nothing was answered.
    pub fn build(&self) -> Option<QuestionnaireItem> {
        let link_id = NonEmptyText::new(&self.link_id).ok()?;
        if self.answers.is_empty() && self.items.is_empty() {
            return None;
        }
        Some(QuestionnaireItem {
            link_id: link_id.into_string(),
            text: self.text.clone(),
            answer: self.answers.clone(),
            item: self.items.clone(),
        })
    }
}

/// Draft for a [`QuestionnaireResponse`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionnaireResponseBuilder {
    id: Option<String>,
    profile: Option<String>,
    questionnaire: Option<String>,
    status: Option<QuestionnaireResponseStatus>,
    subject: Option<Reference>,
    items: Vec<QuestionnaireItem>,
}

impl QuestionnaireResponseBuilder {
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

    pub fn questionnaire(mut self, url: impl Into<String>) -> Self {
        self.questionnaire = Some(url.into());
        self
    }

    pub fn status(mut self, status: QuestionnaireResponseStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn subject(mut self, subject: Reference) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Adds a top-level item. An empty item is dropped.
    pub fn item(mut self, item: QuestionnaireItemBuilder) -> Self {
        if let Some(item) = item.build() {
            self.items.push(item);
        }
        self
    }

    /// Fills id, profile, questionnaire and status if they are unset.
    pub fn set_defaults(mut self, generators: &Generators) -> Self {
        if self.id.is_none() {
            self.id = Some(generators.next_id().to_string());
        }
        if self.profile.is_none() {
            self.profile = Some(PROFILE_DISEASE_QUESTIONNAIRE_RESPONSE.to_string());
        }
        if self.questionnaire.is_none() {
            self.questionnaire = Some(DEFAULT_QUESTIONNAIRE.to_string());
        }
        if self.status.is_none() {
            self.status = Some(QuestionnaireResponseStatus::Completed);
        }
        self
    }

    pub fn build(&self) -> QuestionnaireResponse {
        QuestionnaireResponse {
            id: self.id.clone().unwrap_or_default(),
            meta: self
                .profile
                .as_ref()
                .map(|p| Meta::with_profile(p.clone()))
                .unwrap_or_default(),
            questionnaire: self.questionnaire.clone(),
            status: self.status.unwrap_or_default(),
            subject: self.subject.clone(),
            item: self.items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_uuid::{FixedClock, SequentialIdGenerator};

    fn generators() -> Generators {
        Generators::new(
            SequentialIdGenerator::new(),
            FixedClock::parse("2024-03-01T10:00:00Z").unwrap(),
        )
    }

    #[test]
    fn unanswered_items_are_dropped() {
        assert_eq!(QuestionnaireItemBuilder::new("isolation").build(), None);

        let response = QuestionnaireResponseBuilder::new()
            .item(QuestionnaireItemBuilder::new("isolation"))
            .item(QuestionnaireItemBuilder::new("hospitalized").answer(AnswerValue::Boolean(true)))
            .build();

        assert_eq!(response.item.len(), 1);
        assert_eq!(response.item[0].link_id, "hospitalized");
    }

    #[test]
    fn blank_link_id_is_dropped() {
        let item = QuestionnaireItemBuilder::new("  ").answer(AnswerValue::Integer(3));
        assert_eq!(item.build(), None);
    }

    #[test]
    fn nested_items_survive_only_when_answered() {
        let item = QuestionnaireItemBuilder::new("hospitalized")
            .answer_with_items(
                AnswerValue::Boolean(true),
                [
                    QuestionnaireItemBuilder::new("hospitalizedSince")
                        .answer(AnswerValue::Date(FhirDate::parse("2024-02-27").unwrap())),
                    QuestionnaireItemBuilder::new("hospitalizedUntil"),
                ],
            )
            .build()
            .expect("item");

        assert_eq!(item.answer[0].item.len(), 1);
        assert_eq!(item.answer[0].item[0].link_id, "hospitalizedSince");
    }

    #[test]
    fn group_item_without_own_answer_is_kept() {
        let item = QuestionnaireItemBuilder::new("travel")
            .item(
                QuestionnaireItemBuilder::new("country")
                    .answer(AnswerValue::Coding(Coding::new("urn:iso:std:iso:3166", "FR"))),
            )
            .build()
            .expect("group");
        assert_eq!(item.item.len(), 1);
        assert!(item.answer.is_empty());
    }

    #[test]
    fn answers_serialize_under_typed_keys() {
        let item = QuestionnaireItemBuilder::new("q")
            .answer(AnswerValue::Decimal(38.5))
            .answer(AnswerValue::String("fever".into()))
            .build()
            .unwrap();
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["linkId"], "q");
        assert_eq!(json["answer"][0]["valueDecimal"], 38.5);
        assert_eq!(json["answer"][1]["valueString"], "fever");
    }

    #[test]
    fn answer_without_value_is_rejected() {
        let err = serde_json::from_str::<Answer>(r#"{"item":[]}"#)
            .expect_err("value is required");
        assert!(err.to_string().contains("no value"));
    }

    #[test]
    fn set_defaults_is_idempotent() {
        let g = generators();
        let once = QuestionnaireResponseBuilder::new().set_defaults(&g);
        let twice = once.clone().set_defaults(&g);

        assert_eq!(once, twice);
        let response = twice.build();
        assert_eq!(response.id, "00000000-0000-0000-0000-000000000001");
        assert_eq!(response.questionnaire.as_deref(), Some(DEFAULT_QUESTIONNAIRE));
        assert_eq!(response.status, QuestionnaireResponseStatus::Completed);
    }
}
