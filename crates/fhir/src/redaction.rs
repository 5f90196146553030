//! Privacy-graded copies of the notified person.
//!
//! A notified person is always captured by name. Depending on the disease a notification may
//! only carry a reduced projection of that record. [`Redaction::redact`] derives it:
//!
//! - by name: full copy, re-tagged
//! - not by name / non-nominal: id, gender, birth month, selected addresses reduced to the
//!   first three postal-code digits plus country, pseudonym
//! - anonymous: id, gender, birth month
//!
//! The output is a freshly allocated graph; nothing is shared with or written to the source.
//! Redaction never fails: source fields that are missing are simply missing in the output.

use crate::address::{Address, AddressUse};
use crate::constants::{
    EXTENSION_ADDRESS_USE, EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON, EXTENSION_PSEUDONYM,
    PROFILE_NOTIFIED_PERSON, PROFILE_NOTIFIED_PERSON_ANONYMOUS,
    PROFILE_NOTIFIED_PERSON_FACILITY, PROFILE_NOTIFIED_PERSON_NON_NOMINAL,
    PROFILE_NOTIFIED_PERSON_NOT_BY_NAME,
};
use crate::datatypes::{Extension, Meta};
use crate::patient::Patient;
use crate::resource::DomainResource;
use std::fmt;

/// Number of leading postal-code characters kept by redaction.
pub const REDACTED_POSTAL_CODE_LENGTH: usize = 3;

/// How identifiable the notified person is in a notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IdentifiabilityTier {
    #[default]
    ByName,
    NotByName,
    NonNominal,
    Anonymous,
}

impl IdentifiabilityTier {
    pub const ALL: [IdentifiabilityTier; 4] = [
        IdentifiabilityTier::ByName,
        IdentifiabilityTier::NotByName,
        IdentifiabilityTier::NonNominal,
        IdentifiabilityTier::Anonymous,
    ];

    /// Profile URL tagging a Patient of this tier.
    pub fn profile(self) -> &'static str {
        match self {
            IdentifiabilityTier::ByName => PROFILE_NOTIFIED_PERSON,
            IdentifiabilityTier::NotByName => PROFILE_NOTIFIED_PERSON_NOT_BY_NAME,
            IdentifiabilityTier::NonNominal => PROFILE_NOTIFIED_PERSON_NON_NOMINAL,
            IdentifiabilityTier::Anonymous => PROFILE_NOTIFIED_PERSON_ANONYMOUS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IdentifiabilityTier::ByName => "by-name",
            IdentifiabilityTier::NotByName => "not-by-name",
            IdentifiabilityTier::NonNominal => "non-nominal",
            IdentifiabilityTier::Anonymous => "anonymous",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// The tier a Patient claims through its profile, if any.
    pub fn of(patient: &Patient) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| patient.has_profile(t.profile()))
    }
}

impl fmt::Display for IdentifiabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The redaction engine.
pub struct Redaction;

impl Redaction {
    /// Produces a new Patient at `tier` from a fully identified `source`.
    ///
    /// `addresses` are the caller-selected source addresses to carry over. They are ignored for
    /// [`IdentifiabilityTier::ByName`], which copies all addresses, and for
    /// [`IdentifiabilityTier::Anonymous`], which copies none.
    ///
    /// Selection is not filtered by address use. A selected `current` address loses only its
    /// use extension and is otherwise reduced like any other; callers that want it gone leave
    /// it out, as [`default_address_selection`] does.
    pub fn redact(source: &Patient, tier: IdentifiabilityTier, addresses: &[Address]) -> Patient {
        let redacted = match tier {
            IdentifiabilityTier::ByName => Self::by_name(source),
            IdentifiabilityTier::NotByName | IdentifiabilityTier::NonNominal => {
                Self::reduced(source, tier, addresses)
            }
            IdentifiabilityTier::Anonymous => Self::anonymous(source),
        };
        tracing::debug!(
            patient_id = %source.id,
            tier = %tier,
            addresses = redacted.address.len(),
            "redacted notified person"
        );
        redacted
    }

    fn by_name(source: &Patient) -> Patient {
        let mut copy = source.clone();
        copy.meta = Meta::with_profile(IdentifiabilityTier::ByName.profile());
        copy
    }

    fn anonymous(source: &Patient) -> Patient {
        Patient {
            id: source.id.clone(),
            meta: Meta::with_profile(IdentifiabilityTier::Anonymous.profile()),
            gender: source.gender,
            gender_element: source.gender_element.clone(),
            birth_date: source.birth_date.map(|d| d.truncate_to_month()),
            ..Patient::default()
        }
    }

    fn reduced(source: &Patient, tier: IdentifiabilityTier, addresses: &[Address]) -> Patient {
        let mut patient = Self::anonymous(source);
        patient.meta = Meta::with_profile(tier.profile());
        patient.address = addresses.iter().filter_map(redact_address).collect();
        patient.extension = source
            .extension
            .iter()
            .filter(|ext| ext.url == EXTENSION_PSEUDONYM)
            .cloned()
            .collect();
        patient
    }
}

/// The first three characters of a postal code, or the whole code if it is shorter.
pub fn truncate_postal_code(postal_code: &str) -> String {
    postal_code
        .chars()
        .take(REDACTED_POSTAL_CODE_LENGTH)
        .collect()
}

/// Addresses carried into a reduced notification when the caller makes no choice: every
/// address except the one the person is currently staying at.
pub fn default_address_selection(patient: &Patient) -> Vec<Address> {
    patient
        .address
        .iter()
        .filter(|a| a.address_use() != Some(AddressUse::Current))
        .cloned()
        .collect()
}

fn redact_address(source: &Address) -> Option<Address> {
    let address = Address {
        extension: source
            .extension
            .iter()
            .filter_map(redact_address_extension)
            .collect(),
        line: Vec::new(),
        line_element: Vec::new(),
        city: None,
        postal_code: source
            .postal_code
            .as_deref()
            .map(truncate_postal_code)
            .filter(|p| !p.is_empty()),
        country: source.country.clone(),
    };

    // an address without geography survives only as a facility link
    if address.postal_code.is_none()
        && address.country.is_none()
        && address.facility_reference().is_none()
    {
        tracing::debug!("address has no postal code, country or facility; omitting it");
        return None;
    }
    Some(address)
}

fn redact_address_extension(ext: &Extension) -> Option<Extension> {
    match ext.url.as_str() {
        EXTENSION_ADDRESS_USE => match AddressUse::from_extension(ext) {
            Some(AddressUse::Current) => None,
            Some(AddressUse::Primary | AddressUse::Ordinary) => Some(ext.clone()),
            None => {
                tracing::warn!("dropping address-use extension with unknown code");
                None
            }
        },
        EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON => {
            let reference = ext.value_reference()?;
            match reference.resolved().and_then(|r| r.as_organization()) {
                Some(org) if org.has_profile(PROFILE_NOTIFIED_PERSON_FACILITY) => {
                    tracing::debug!(
                        organization_id = %org.id,
                        "dropping reference to notified-person facility"
                    );
                    None
                }
                Some(_) => Some(ext.clone()),
                None => {
                    tracing::warn!(
                        reference = reference.reference().unwrap_or(""),
                        "facility reference is not resolved; keeping it as text"
                    );
                    Some(ext.clone())
                }
            }
        }
        other => {
            tracing::debug!(url = other, "dropping address extension");
            None
        }
    }
}
