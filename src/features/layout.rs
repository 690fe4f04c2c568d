//! Feature layout: the 64 field names in the exact order the scaler and model were fitted on.
//!
//! Rules:
//! 1. Never reorder, insert or remove a field; trained artifacts address features by position.
//! 2. Index constants below are 0-based positions into [`FEATURE_NAMES`].

/// Total number of features
pub const FEATURE_COUNT: usize = 64;

/// Number of placeholder slots reserved for page/network-derived signals
pub const WEB_SLOT_COUNT: usize = 26;

pub const IDX_URL_LEN: usize = 0;
pub const IDX_DOUBLE_SLASH: usize = 13;
pub const IDX_ABNORMAL_URL: usize = 14;
pub const IDX_NOT_HTTPS: usize = 15;
pub const IDX_DIGITS: usize = 16;
pub const IDX_LETTERS: usize = 17;
pub const IDX_SHORTENER: usize = 18;
pub const IDX_IP_ADDRESS: usize = 19;

/// First web placeholder slot
pub const IDX_WEB_START: usize = 20;
/// Placeholder slots pinned to 1 (positions 13 and 26 of the web block, 1-based)
pub const IDX_WEB_SSL_VALID: usize = IDX_WEB_START + 12;
pub const IDX_WEB_SSL_VALID_1: usize = IDX_WEB_START + 25;

pub const IDX_URGENCY_WORDS: usize = 46;
pub const IDX_SECURITY_WORDS: usize = 47;
pub const IDX_BRAND_MENTIONS: usize = 48;
pub const IDX_BRAND_HIJACK: usize = 49;

pub const IDX_MULTIPLE_SUBDOMAINS: usize = 50;
pub const IDX_LONG_PATH: usize = 51;
pub const IDX_MANY_PARAMS: usize = 52;
pub const IDX_SUSPICIOUS_TLD: usize = 53;
pub const IDX_HOSTNAME_DIVERSITY: usize = 54;
pub const IDX_PATH_SLASHES: usize = 55;
pub const IDX_PATH_DIVERSITY: usize = 56;
pub const IDX_HOSTNAME_DOTS: usize = 57;
pub const IDX_AVG_LABEL_LEN: usize = 58;
pub const IDX_CONSONANT_RATIO: usize = 59;
pub const IDX_VOWEL_RATIO: usize = 60;
pub const IDX_DIGIT_RATIO: usize = 61;
pub const IDX_MEAN_TOKEN_LEN: usize = 62;
pub const IDX_TOKEN_COUNT: usize = 63;

/// Feature names in exact vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // === Lexical counts (0-19) ===
    "url_len",
    "count_at",
    "count_question",
    "count_hyphen",
    "count_equals",
    "count_dot",
    "count_hash",
    "count_percent",
    "count_plus",
    "count_dollar",
    "count_exclamation",
    "count_star",
    "count_comma",
    "count_double_slash",
    "abnormal_url",
    "https",
    "digits",
    "letters",
    "shortening_service",
    "having_ip_address",
    // === Web placeholders (20-45) ===
    "web_slot_00",
    "web_slot_01",
    "web_slot_02",
    "web_slot_03",
    "web_slot_04",
    "web_slot_05",
    "web_slot_06",
    "web_slot_07",
    "web_slot_08",
    "web_slot_09",
    "web_slot_10",
    "web_slot_11",
    "web_ssl_valid",
    "web_slot_13",
    "web_slot_14",
    "web_slot_15",
    "web_slot_16",
    "web_slot_17",
    "web_slot_18",
    "web_slot_19",
    "web_slot_20",
    "web_slot_21",
    "web_slot_22",
    "web_slot_23",
    "web_slot_24",
    "web_ssl_valid.1",
    // === Keyword / brand flags (46-49) ===
    "phish_urgency_words",
    "phish_security_words",
    "phish_brand_mentions",
    "phish_brand_hijack",
    // === Structural (50-63) ===
    "phish_multiple_subdomains",
    "phish_long_path",
    "phish_many_params",
    "phish_suspicious_tld",
    "hostname_char_diversity",
    "path_slash_count",
    "path_char_diversity",
    "hostname_dot_count",
    "avg_label_length",
    "consonant_ratio",
    "vowel_ratio",
    "digit_ratio",
    "mean_token_length",
    "token_count",
];

/// Look up a feature's position by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let set: HashSet<_> = FEATURE_NAMES.iter().collect();
        assert_eq!(set.len(), FEATURE_COUNT);
    }

    #[test]
    fn index_constants_match_names() {
        assert_eq!(feature_index("abnormal_url"), Some(IDX_ABNORMAL_URL));
        assert_eq!(feature_index("https"), Some(IDX_NOT_HTTPS));
        assert_eq!(feature_index("web_ssl_valid"), Some(IDX_WEB_SSL_VALID));
        assert_eq!(feature_index("web_ssl_valid.1"), Some(IDX_WEB_SSL_VALID_1));
        assert_eq!(feature_index("phish_urgency_words"), Some(IDX_URGENCY_WORDS));
        assert_eq!(feature_index("phish_suspicious_tld"), Some(IDX_SUSPICIOUS_TLD));
        assert_eq!(feature_index("token_count"), Some(IDX_TOKEN_COUNT));
        assert_eq!(IDX_WEB_SSL_VALID_1 + 1, IDX_URGENCY_WORDS);
        assert_eq!(IDX_WEB_START + WEB_SLOT_COUNT, IDX_URGENCY_WORDS);
    }
}
