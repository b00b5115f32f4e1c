//! Person records and passport validation.
//!
//! # Invariants
//! - `(passport_series, passport_number)` identifies at most one person.
//! - Empty fields in a [`PersonPatch`] leave stored values unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned person identifier.
pub type PersonId = i64;

pub const SERIES_LEN: usize = 4;
pub const NUMBER_LEN: usize = 6;
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

static PASSPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4}) ([0-9]{6})$").expect("passport regex is valid"));

/// Persisted person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub passport_series: String,
    pub passport_number: String,
    pub surname: String,
    pub name: String,
    pub patronymic: String,
    pub address: String,
}

/// Validated passport identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passport {
    series: String,
    number: String,
}

impl Passport {
    /// Parses the `"SSSS NNNNNN"` form accepted at registration.
    pub fn parse(raw: &str) -> Result<Self, PassportError> {
        let captures = PASSPORT_RE
            .captures(raw.trim())
            .ok_or_else(|| PassportError::Malformed(raw.to_string()))?;
        Ok(Self {
            series: captures[1].to_string(),
            number: captures[2].to_string(),
        })
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn number(&self) -> &str {
        &self.number
    }
}

impl Display for Passport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.series, self.number)
    }
}

/// Passport format violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassportError {
    /// Input does not match `"SSSS NNNNNN"`.
    Malformed(String),
    /// Series is not exactly 4 ASCII digits.
    InvalidSeries(String),
    /// Number is not exactly 6 ASCII digits.
    InvalidNumber(String),
}

impl Display for PassportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(raw) => write!(
                f,
                "passport `{raw}` must be {SERIES_LEN} digits, a space and {NUMBER_LEN} digits"
            ),
            Self::InvalidSeries(value) => {
                write!(f, "passport series `{value}` must be {SERIES_LEN} digits")
            }
            Self::InvalidNumber(value) => {
                write!(f, "passport number `{value}` must be {NUMBER_LEN} digits")
            }
        }
    }
}

impl Error for PassportError {}

pub fn validate_series(value: &str) -> Result<(), PassportError> {
    if is_ascii_digits(value, SERIES_LEN) {
        Ok(())
    } else {
        Err(PassportError::InvalidSeries(value.to_string()))
    }
}

pub fn validate_number(value: &str) -> Result<(), PassportError> {
    if is_ascii_digits(value, NUMBER_LEN) {
        Ok(())
    } else {
        Err(PassportError::InvalidNumber(value.to_string()))
    }
}

fn is_ascii_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|byte| byte.is_ascii_digit())
}

/// Descriptive fields, usually supplied by the external people-info lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonProfile {
    pub surname: String,
    pub name: String,
    pub patronymic: String,
    pub address: String,
}

/// Partial update; `None` and empty strings mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersonPatch {
    pub passport_series: Option<String>,
    pub passport_number: Option<String>,
    pub surname: Option<String>,
    pub name: Option<String>,
    pub patronymic: Option<String>,
    pub address: Option<String>,
}

impl PersonPatch {
    /// Checks the passport parts that are actually being changed.
    pub fn validate(&self) -> Result<(), PassportError> {
        if let Some(series) = non_empty(&self.passport_series) {
            validate_series(series)?;
        }
        if let Some(number) = non_empty(&self.passport_number) {
            validate_number(number)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.passport_series,
            &self.passport_number,
            &self.surname,
            &self.name,
            &self.patronymic,
            &self.address,
        ]
        .into_iter()
        .all(|field| non_empty(field).is_none())
    }
}

/// Exact-match listing filter; unset and empty fields are ignored.
///
/// `id` is accepted as a JSON number or a numeric string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersonFilter {
    #[serde(deserialize_with = "deserialize_filter_id")]
    pub id: Option<PersonId>,
    pub passport_series: Option<String>,
    pub passport_number: Option<String>,
    pub surname: Option<String>,
    pub name: Option<String>,
    pub patronymic: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterId {
    Number(PersonId),
    Text(String),
}

fn deserialize_filter_id<'de, D>(deserializer: D) -> Result<Option<PersonId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FilterId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FilterId::Number(id)) => Ok(Some(id)),
        Some(FilterId::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid person id `{text}`")))
        }
    }
}

/// One-based page window for person listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonPage {
    page: u32,
    limit: u32,
}

impl PersonPage {
    /// Normalizes caller input: page defaults to 1 and is at least 1, limit
    /// defaults to [`DEFAULT_PAGE_LIMIT`] and is clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PersonPage {
    fn default() -> Self {
        Self::new(None, None)
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Passport, PassportError, PersonFilter, PersonPage, PersonPatch};

    #[test]
    fn parse_accepts_series_space_number() {
        let passport = Passport::parse("1234 567890").unwrap();
        assert_eq!(passport.series(), "1234");
        assert_eq!(passport.number(), "567890");
        assert_eq!(passport.to_string(), "1234 567890");
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for raw in ["123 567890", "1234-567890", "12a4 567890", "1234 5678901", ""] {
            let err = Passport::parse(raw).unwrap_err();
            assert!(matches!(err, PassportError::Malformed(_)), "{raw}");
        }
    }

    #[test]
    fn parse_rejects_non_ascii_digits() {
        assert!(Passport::parse("١٢٣٤ 567890").is_err());
    }

    #[test]
    fn patch_validates_only_supplied_passport_parts() {
        let patch = PersonPatch {
            passport_series: Some(String::new()),
            surname: Some("Ivanov".to_string()),
            ..PersonPatch::default()
        };
        assert!(patch.validate().is_ok());

        let bad = PersonPatch {
            passport_number: Some("12345".to_string()),
            ..PersonPatch::default()
        };
        assert_eq!(
            bad.validate(),
            Err(PassportError::InvalidNumber("12345".to_string()))
        );
    }

    #[test]
    fn patch_with_only_empty_fields_is_empty() {
        let patch = PersonPatch {
            name: Some(String::new()),
            ..PersonPatch::default()
        };
        assert!(patch.is_empty());
    }

    #[test]
    fn page_normalizes_bounds() {
        let page = PersonPage::new(Some(0), Some(0));
        assert_eq!((page.limit(), page.offset()), (1, 0));

        let page = PersonPage::new(Some(3), Some(500));
        assert_eq!(page.limit(), 100);
        assert_eq!(page.offset(), 200);

        assert_eq!(PersonPage::default().limit(), 10);
    }

    #[test]
    fn filter_id_accepts_number_or_numeric_string() {
        let from_number: PersonFilter = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        let from_text: PersonFilter = serde_json::from_str(r#"{"id": " 3 "}"#).unwrap();
        assert_eq!(from_number.id, Some(3));
        assert_eq!(from_text, from_number);

        let blank: PersonFilter =
            serde_json::from_str(r#"{"id": "", "surname": "Ivanov"}"#).unwrap();
        assert_eq!(blank.id, None);
        assert_eq!(blank.surname.as_deref(), Some("Ivanov"));

        let null: PersonFilter = serde_json::from_str(r#"{"id": null}"#).unwrap();
        assert_eq!(null.id, None);

        assert!(serde_json::from_str::<PersonFilter>(r#"{"id": "three"}"#).is_err());
    }
}
