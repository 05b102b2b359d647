//! Language and timezone validation for member provisioning.
//!
//! Hootsuite accepts a fixed set of interface languages; timezones are
//! anything the IANA database knows about.

/// Interface languages Hootsuite accepts for a member.
const ACCEPTED_LANGUAGES: &[&str] = &[
    "en", "ja", "fr", "it", "es", "de", "pt_BR", "pl", "id", "zh_CN", "zh_HK", "zh_TW", "nl", "ko",
    "ar", "ru", "th", "tr",
];

/// Returns true if `language` is on the accepted list.
pub fn is_valid_language(language: &str) -> bool {
    ACCEPTED_LANGUAGES.contains(&language)
}

/// Returns true if `timezone` names an entry in the IANA database.
pub fn is_valid_timezone(timezone: &str) -> bool {
    timezone.parse::<chrono_tz::Tz>().is_ok()
}
