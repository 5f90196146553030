//! Profile, naming-system and code-system URLs.
//!
//! This is the flat symbolic-name → URL table shared by the builders, the bundle assembler and
//! the redaction engine. Nothing in this crate validates that the URLs resolve.

/* Base */
pub const DEMIS_BASE: &str = "https://demis.rki.de/fhir";

/* Resource Profiles */
pub const PROFILE_NOTIFICATION_BUNDLE_DISEASE: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotificationBundleDisease";
pub const PROFILE_NOTIFICATION_DISEASE: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotificationDisease";
pub const PROFILE_NOTIFIED_PERSON: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifiedPerson";
pub const PROFILE_NOTIFIED_PERSON_NOT_BY_NAME: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifiedPersonNotByName";
pub const PROFILE_NOTIFIED_PERSON_NON_NOMINAL: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifiedPersonNonNominal";
pub const PROFILE_NOTIFIED_PERSON_ANONYMOUS: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifiedPersonAnonymous";
pub const PROFILE_NOTIFIED_PERSON_FACILITY: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifiedPersonFacility";
pub const PROFILE_NOTIFIER_ROLE: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifierRole";
pub const PROFILE_NOTIFIER: &str = "https://demis.rki.de/fhir/StructureDefinition/Notifier";
pub const PROFILE_NOTIFIER_FACILITY: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifierFacility";
pub const PROFILE_DISEASE_QUESTIONNAIRE_RESPONSE: &str =
    "https://demis.rki.de/fhir/StructureDefinition/DiseaseInformationCommon";

/* Extensions */
pub const EXTENSION_ADDRESS_USE: &str =
    "https://demis.rki.de/fhir/StructureDefinition/AddressUse";
pub const EXTENSION_FACILITY_ADDRESS_NOTIFIED_PERSON: &str =
    "https://demis.rki.de/fhir/StructureDefinition/FacilityAddressNotifiedPerson";
pub const EXTENSION_PSEUDONYM: &str =
    "https://demis.rki.de/fhir/StructureDefinition/PseudonymRecord";
pub const EXTENSION_GENDER_AMTLICH_DE: &str =
    "http://fhir.de/StructureDefinition/gender-amtlich-de";
pub const EXTENSION_ADXP_STREET_NAME: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-streetName";
pub const EXTENSION_ADXP_HOUSE_NUMBER: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-houseNumber";
pub const EXTENSION_ADXP_ADDITIONAL_LOCATOR: &str =
    "http://hl7.org/fhir/StructureDefinition/iso21090-ADXP-additionalLocator";

/* Naming Systems */
pub const NAMING_SYSTEM_NOTIFICATION_BUNDLE_ID: &str =
    "https://demis.rki.de/fhir/NamingSystem/NotificationBundleId";
pub const NAMING_SYSTEM_NOTIFICATION_ID: &str =
    "https://demis.rki.de/fhir/NamingSystem/NotificationId";

/* Code Systems */
pub const CODE_SYSTEM_ADDRESS_USE: &str = "https://demis.rki.de/fhir/CodeSystem/addressUse";
pub const CODE_SYSTEM_GENDER_AMTLICH_DE: &str =
    "http://fhir.de/CodeSystem/gender-amtlich-de";
pub const CODE_SYSTEM_LOINC: &str = "http://loinc.org";
pub const CODE_SYSTEM_NOTIFICATION_TYPE: &str =
    "https://demis.rki.de/fhir/CodeSystem/notificationType";
pub const CODE_SYSTEM_SECTION_CODE: &str = "https://demis.rki.de/fhir/CodeSystem/sectionCode";
pub const CODE_SYSTEM_ORGANIZATION_TYPE: &str =
    "https://demis.rki.de/fhir/CodeSystem/organizationType";

/* Codes */
pub const LOINC_NOTIFICATION_FORM: &str = "34782-3";
pub const NOTIFICATION_TYPE_DISEASE: &str = "6.1_2";
pub const SECTION_CODE_DISEASE_COMMON: &str = "diseaseInformationCommon";
