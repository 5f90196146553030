//! Human names.

use serde::{Deserialize, Serialize};

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUse {
    /// Official name.
    Official,
    /// Usual/preferred name.
    Usual,
    /// Temporary name.
    Temp,
    /// Nickname or informal name.
    Nickname,
    /// Anonymous name.
    Anonymous,
    /// Old name (no longer in use).
    Old,
    /// Maiden name.
    Maiden,
}

impl NameUse {
    pub fn as_str(self) -> &'static str {
        match self {
            NameUse::Official => "official",
            NameUse::Usual => "usual",
            NameUse::Temp => "temp",
            NameUse::Nickname => "nickname",
            NameUse::Anonymous => "anonymous",
            NameUse::Old => "old",
            NameUse::Maiden => "maiden",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "official" => Some(NameUse::Official),
            "usual" => Some(NameUse::Usual),
            "temp" => Some(NameUse::Temp),
            "nickname" => Some(NameUse::Nickname),
            "anonymous" => Some(NameUse::Anonymous),
            "old" => Some(NameUse::Old),
            "maiden" => Some(NameUse::Maiden),
            _ => None,
        }
    }
}

/// A person's name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<NameUse>,

    /// Full name as displayed, composed from the parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,
}

/// Draft for a [`HumanName`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HumanNameBuilder {
    use_type: Option<NameUse>,
    family: Option<String>,
    given: Vec<String>,
    prefix: Vec<String>,
}

impl HumanNameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_type(mut self, use_type: NameUse) -> Self {
        self.use_type = Some(use_type);
        self
    }

    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Adds a given name. Call repeatedly for middle names.
    pub fn given(mut self, given: impl Into<String>) -> Self {
        self.given.push(given.into());
        self
    }

    /// Adds a prefix such as an academic title.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix.push(prefix.into());
        self
    }

    /// Builds the name, or `None` if no part carries any text.
    pub fn build(&self) -> Option<HumanName> {
        let clean = |parts: &[String]| -> Vec<String> {
            parts
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        };
        let family = self
            .family
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        let given = clean(&self.given);
        let prefix = clean(&self.prefix);

        if family.is_none() && given.is_empty() && prefix.is_empty() {
            return None;
        }

        let text = prefix
            .iter()
            .chain(given.iter())
            .chain(family.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        Some(HumanName {
            use_type: Some(self.use_type.unwrap_or(NameUse::Official)),
            text: Some(text),
            family,
            given,
            prefix,
        })
    }
}
