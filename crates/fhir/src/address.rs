//! Postal addresses of notified persons, notifiers and facilities.
//!
//! Street, house number and additional information are composed into a single `line` entry;
//! the parts are kept as ISO 21090 ADXP extensions on `_line` so that a receiver can split
//! them again.
//!
//! Two address extensions drive redaction:
//! - the address-use coding (`current`, `primary`, `ordinary`),
//! - the facility reference, which says "this address is the address of facility X".

use crate::constants::{
    CODE_SYSTEM_ADDRESS_USE, EXTENSION_ADDRESS_USE, EXTENSION_ADXP_ADDITIONAL_LOCATOR,
    EXTENSION_ADXP_HOUSE_NUMBER, EXTENSION_ADXP_STREET_NAME,
    EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON,
};
use crate::datatypes::{Coding, Element, Extension, ExtensionValue};
use crate::reference::Reference;
use notify_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// Role of an address for the notified person.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressUse {
    /// Where the person is staying right now (e.g. a hospital).
    Current,
    /// Main residence.
    Primary,
    /// Habitual residence without a registered main residence.
    Ordinary,
}

impl AddressUse {
    pub fn code(self) -> &'static str {
        match self {
            AddressUse::Current => "current",
            AddressUse::Primary => "primary",
            AddressUse::Ordinary => "ordinary",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "current" => Some(AddressUse::Current),
            "primary" => Some(AddressUse::Primary),
            "ordinary" => Some(AddressUse::Ordinary),
            _ => None,
        }
    }

    /// The address-use coding extension carrying this value.
    pub fn to_extension(self) -> Extension {
        Extension::new(
            EXTENSION_ADDRESS_USE,
            ExtensionValue::Coding(Coding::new(CODE_SYSTEM_ADDRESS_USE, self.code())),
        )
    }

    /// Reads the value back from an address-use extension.
    pub fn from_extension(ext: &Extension) -> Option<Self> {
        if ext.url != EXTENSION_ADDRESS_USE {
            return None;
        }
        ext.value_coding()
            .and_then(|c| c.code.as_deref())
            .and_then(Self::parse)
    }
}

/// A postal address.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(rename = "_line", default, skip_serializing_if = "Vec::is_empty")]
    pub line_element: Vec<Element>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    /// The first address-use value found on this address.
    pub fn address_use(&self) -> Option<AddressUse> {
        self.extension.iter().find_map(AddressUse::from_extension)
    }

    /// The facility this address belongs to, if any.
    pub fn facility_reference(&self) -> Option<&Reference> {
        self.extension
            .iter()
            .filter(|ext| ext.url == EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON)
            .find_map(Extension::value_reference)
    }

    pub fn is_empty(&self) -> bool {
        self.extension.is_empty()
            && self.line.is_empty()
            && self.city.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
    }
}

/// Draft for an [`Address`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddressBuilder {
    street: Option<String>,
    house_number: Option<String>,
    additional_info: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
    country: Option<String>,
    address_use: Option<AddressUse>,
    facility: Option<Reference>,
}

impl AddressBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn house_number(mut self, house_number: impl Into<String>) -> Self {
        self.house_number = Some(house_number.into());
        self
    }

    pub fn additional_info(mut self, additional_info: impl Into<String>) -> Self {
        self.additional_info = Some(additional_info.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// ISO 3166 country code, e.g. `DE`.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn address_use(mut self, address_use: AddressUse) -> Self {
        self.address_use = Some(address_use);
        self
    }

    /// Marks the address as the address of the referenced facility.
    pub fn facility(mut self, organization: Reference) -> Self {
        self.facility = Some(organization);
        self
    }

    /// Builds the address, or `None` if nothing at all was set.
    pub fn build_optional(&self) -> Option<Address> {
        let address = self.build();
        (!address.is_empty()).then_some(address)
    }

    /// Builds the address. Blank text fields are treated as unset.
    pub fn build(&self) -> Address {
        let street = NonEmptyText::from_optional(self.street.as_deref());
        let house_number = NonEmptyText::from_optional(self.house_number.as_deref());
        let additional = NonEmptyText::from_optional(self.additional_info.as_deref());

        let mut line_parts = Vec::new();
        let mut line_extensions = Vec::new();
        if let Some(street) = &street {
            line_parts.push(street.as_str().to_string());
            line_extensions.push(Extension::new(
                EXTENSION_ADXP_STREET_NAME,
                ExtensionValue::String(street.to_string()),
            ));
        }
        if let Some(number) = &house_number {
            line_parts.push(number.as_str().to_string());
            line_extensions.push(Extension::new(
                EXTENSION_ADXP_HOUSE_NUMBER,
                ExtensionValue::String(number.to_string()),
            ));
        }
        let mut line = line_parts.join(" ");
        if let Some(additional) = &additional {
            if !line.is_empty() {
                line.push_str(", ");
            }
            line.push_str(additional.as_str());
            line_extensions.push(Extension::new(
                EXTENSION_ADXP_ADDITIONAL_LOCATOR,
                ExtensionValue::String(additional.to_string()),
            ));
        }

        let mut extension = Vec::new();
        if let Some(address_use) = self.address_use {
            extension.push(address_use.to_extension());
        }
        if let Some(facility) = &self.facility {
            extension.push(Extension::new(
                EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON,
                ExtensionValue::Reference(facility.clone()),
            ));
        }

        let (line, line_element) = if line.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            (
                vec![line],
                vec![Element {
                    extension: line_extensions,
                }],
            )
        };

        Address {
            extension,
            line,
            line_element,
            city: NonEmptyText::from_optional(self.city.as_deref()).map(String::from),
            postal_code: NonEmptyText::from_optional(self.postal_code.as_deref())
                .map(String::from),
            country: NonEmptyText::from_optional(self.country.as_deref()).map(String::from),
        }
    }
}
