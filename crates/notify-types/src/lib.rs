//! Small value types shared by the notification crates.

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("Text cannot be empty")]
    Empty,
}

/// Trimmed text with at least one non-whitespace character. Builders take form-style input
/// through it so blank fields count as unset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// `None` for absent, empty and whitespace-only input alike.
    pub fn from_optional<S: AsRef<str>>(input: Option<S>) -> Option<Self> {
        input.and_then(|s| Self::new(s).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NonEmptyText> for String {
    fn from(value: NonEmptyText) -> Self {
        value.0
    }
}

impl TryFrom<String> for NonEmptyText {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_input() {
        let text = NonEmptyText::new("  Berlin \n").expect("non-empty");
        assert_eq!(text.as_str(), "Berlin");
    }

    #[test]
    fn rejects_whitespace_only() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn from_optional_collapses_blank_values() {
        assert_eq!(NonEmptyText::from_optional(None::<&str>), None);
        assert_eq!(NonEmptyText::from_optional(Some("")), None);
        assert_eq!(NonEmptyText::from_optional(Some(" \t")), None);
        assert_eq!(
            NonEmptyText::from_optional(Some(" 10115 ")).map(String::from),
            Some("10115".to_string())
        );
    }

    #[test]
    fn deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").expect_err("should reject");
        assert!(err.to_string().contains("Text cannot be empty"));
    }
}
