//! URL → 64-dim lexical/structural feature vector. Pure: no I/O, no state, never fails.

use super::layout::*;
use super::url_parts::{split_lossy, UrlParts};
use super::FeatureVector;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Characters counted one-by-one at positions 1..=12
const COUNTED_CHARS: [char; 12] = ['@', '?', '-', '=', '.', '#', '%', '+', '$', '!', '*', ','];

const SHORTENERS: &[&str] = &["bit.ly", "t.co", "goo.gl"];
const URGENCY_WORDS: &[&str] = &["urgent", "action", "verify", "update"];
const SECURITY_WORDS: &[&str] = &["secure", "login", "auth", "signin"];
const SUSPICIOUS_TLDS: &[&str] = &[".xyz", ".top", ".work", ".casa", ".support", ".online", ".site"];

const LONG_PATH_LEN: usize = 50;
const MANY_PARAMS: usize = 3;
const MULTI_SUBDOMAIN_DOTS: usize = 2;

fn ipv4_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").unwrap())
}

fn token_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+").unwrap())
}

// Decimal digits (Nd) and letters (L*); `char::is_numeric`/`is_alphabetic` are wider
// (they admit '½', 'Ⅻ', combining marks) and would drift from the trained features.
// Known gap: superscript digits ('²') are not counted.
fn decimal_digit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Nd}").unwrap())
}

fn letter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{L}").unwrap())
}

fn count_digits(s: &str) -> usize {
    decimal_digit().find_iter(s).count()
}

fn count_letters(s: &str) -> usize {
    letter().find_iter(s).count()
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Unique characters over length; 0 for an empty string
fn char_diversity(s: &str) -> f32 {
    let len = s.chars().count();
    let unique = s.chars().collect::<HashSet<_>>().len();
    ratio(unique, len)
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Stateless extractor; kept as a type so callers can hold it next to the other stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, url: &str) -> FeatureVector {
        extract(url)
    }
}

/// Extract the full feature vector for `url`.
pub fn extract(url: &str) -> FeatureVector {
    let parts = split_lossy(url);
    let mut v = [0.0f32; FEATURE_COUNT];

    encode_lexical(url, &parts, &mut v);
    encode_web_placeholders(&mut v);
    encode_keywords(url, &mut v);
    encode_structural(url, &parts, &mut v);

    FeatureVector::from_values(v)
}

fn encode_lexical(url: &str, parts: &UrlParts, v: &mut [f32; FEATURE_COUNT]) {
    v[IDX_URL_LEN] = url.chars().count() as f32;
    for (i, c) in COUNTED_CHARS.iter().enumerate() {
        v[IDX_URL_LEN + 1 + i] = url.matches(*c).count() as f32;
    }
    v[IDX_DOUBLE_SLASH] = url.matches("//").count() as f32;
    v[IDX_ABNORMAL_URL] = flag(parts.hostname.is_empty());
    v[IDX_NOT_HTTPS] = flag(!url.starts_with("https"));
    v[IDX_DIGITS] = count_digits(url) as f32;
    v[IDX_LETTERS] = count_letters(url) as f32;
    v[IDX_SHORTENER] = flag(SHORTENERS.iter().any(|s| url.contains(s)));
    v[IDX_IP_ADDRESS] = flag(ipv4_pattern().is_match(url));
}

// Slots for signals that need a live fetch (certificate checks and the like).
// Two are pinned to 1 to match what the trained artifacts saw.
fn encode_web_placeholders(v: &mut [f32; FEATURE_COUNT]) {
    v[IDX_WEB_START..IDX_WEB_START + WEB_SLOT_COUNT].fill(0.0);
    v[IDX_WEB_SSL_VALID] = 1.0;
    v[IDX_WEB_SSL_VALID_1] = 1.0;
}

fn encode_keywords(url: &str, v: &mut [f32; FEATURE_COUNT]) {
    let lower = url.to_lowercase();
    v[IDX_URGENCY_WORDS] = flag(URGENCY_WORDS.iter().any(|w| lower.contains(w)));
    v[IDX_SECURITY_WORDS] = flag(SECURITY_WORDS.iter().any(|w| lower.contains(w)));
    // Brand detection is not implemented
    v[IDX_BRAND_MENTIONS] = 0.0;
    v[IDX_BRAND_HIJACK] = 0.0;
}

fn encode_structural(url: &str, parts: &UrlParts, v: &mut [f32; FEATURE_COUNT]) {
    let host = parts.hostname.as_str();
    let path = parts.path.as_str();
    let host_len = host.chars().count();
    let host_dots = host.matches('.').count();
    let url_len = url.chars().count();

    v[IDX_MULTIPLE_SUBDOMAINS] = flag(host_dots > MULTI_SUBDOMAIN_DOTS);
    v[IDX_LONG_PATH] = flag(path.chars().count() > LONG_PATH_LEN);
    v[IDX_MANY_PARAMS] = flag(url.matches('&').count() > MANY_PARAMS);
    v[IDX_SUSPICIOUS_TLD] = flag(SUSPICIOUS_TLDS.iter().any(|t| host.ends_with(t)));

    v[IDX_HOSTNAME_DIVERSITY] = char_diversity(host);
    v[IDX_PATH_SLASHES] = path.matches('/').count() as f32;
    v[IDX_PATH_DIVERSITY] = char_diversity(path);
    v[IDX_HOSTNAME_DOTS] = host_dots as f32;
    v[IDX_AVG_LABEL_LEN] = ratio(host_len, host_dots + 1);

    let vowels = url.chars().filter(|c| is_vowel(*c)).count();
    let consonants = count_letters(url) - vowels;
    let digits = count_digits(url);
    v[IDX_CONSONANT_RATIO] = ratio(consonants, url_len);
    v[IDX_VOWEL_RATIO] = ratio(vowels, url_len);
    v[IDX_DIGIT_RATIO] = ratio(digits, url_len);

    let tokens: Vec<&str> = token_separator()
        .split(url)
        .filter(|t| !t.is_empty())
        .collect();
    let token_chars: usize = tokens.iter().map(|t| t.chars().count()).sum();
    v[IDX_MEAN_TOKEN_LEN] = ratio(token_chars, tokens.len());
    v[IDX_TOKEN_COUNT] = tokens.len() as f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    const MALFORMED: &[&str] = &[
        "",
        "google.com",
        "://",
        "http://",
        "http://[::1",
        "http://[zz]/x",
        "\u{0}\u{1}\u{7f}",
        "ftp://ü.例え.jp/パス?x=1",
        "%%%%",
        "javascript:alert(1)",
    ];

    #[test]
    fn always_64_finite_values() {
        for url in MALFORMED {
            let fv = extract(url);
            assert_eq!(fv.values.len(), FEATURE_COUNT, "{url:?}");
            assert!(fv.values.iter().all(|x| x.is_finite()), "{url:?}");
        }
    }

    #[test]
    fn https_google_flags() {
        let fv = extract("https://google.com");
        assert_eq!(fv.values[IDX_NOT_HTTPS], 0.0);
        assert_eq!(fv.values[IDX_ABNORMAL_URL], 0.0);
        assert_eq!(fv.values[IDX_URL_LEN], 18.0);
        assert_eq!(fv.values[IDX_DOUBLE_SLASH], 1.0);
        assert_eq!(fv.values[IDX_HOSTNAME_DOTS], 1.0);
        assert_eq!(fv.values[IDX_AVG_LABEL_LEN], 5.0);
        assert_eq!(fv.values[IDX_SUSPICIOUS_TLD], 0.0);
        assert_eq!(fv.values[IDX_TOKEN_COUNT], 3.0);
    }

    #[test]
    fn urgent_xyz_flags() {
        let fv = extract("http://urgent-action-required-login.xyz");
        assert_eq!(fv.values[IDX_URGENCY_WORDS], 1.0);
        assert_eq!(fv.values[IDX_SECURITY_WORDS], 1.0);
        assert_eq!(fv.values[IDX_SUSPICIOUS_TLD], 1.0);
        assert_eq!(fv.values[IDX_NOT_HTTPS], 1.0);
        assert_eq!(fv.values[IDX_URL_LEN + 3], 3.0); // hyphens
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let fv = extract("http://example.com/VERIFY/SignIn");
        assert_eq!(fv.values[IDX_URGENCY_WORDS], 1.0);
        assert_eq!(fv.values[IDX_SECURITY_WORDS], 1.0);
    }

    #[test]
    fn empty_url_ratios_are_zero() {
        let fv = extract("");
        for idx in [
            IDX_HOSTNAME_DIVERSITY,
            IDX_PATH_DIVERSITY,
            IDX_CONSONANT_RATIO,
            IDX_VOWEL_RATIO,
            IDX_DIGIT_RATIO,
            IDX_MEAN_TOKEN_LEN,
            IDX_TOKEN_COUNT,
            IDX_AVG_LABEL_LEN,
        ] {
            assert_eq!(fv.values[idx], 0.0, "{}", FEATURE_NAMES[idx]);
        }
        assert_eq!(fv.values[IDX_ABNORMAL_URL], 1.0);
    }

    #[test]
    fn empty_path_diversity_is_zero() {
        let fv = extract("https://example.com");
        assert_eq!(fv.values[IDX_PATH_DIVERSITY], 0.0);
        assert_eq!(fv.values[IDX_PATH_SLASHES], 0.0);
        assert!(fv.values[IDX_HOSTNAME_DIVERSITY] > 0.0);
    }

    #[test]
    fn only_separators_gives_no_tokens() {
        let fv = extract("://..//");
        assert_eq!(fv.values[IDX_TOKEN_COUNT], 0.0);
        assert_eq!(fv.values[IDX_MEAN_TOKEN_LEN], 0.0);
    }

    #[test]
    fn placeholder_slots_are_pinned() {
        for url in MALFORMED.iter().chain(["https://a.b.c.d.example.xyz/p?a=1&b=2"].iter()) {
            let fv = extract(url);
            for i in IDX_WEB_START..IDX_WEB_START + WEB_SLOT_COUNT {
                let expected = if i == IDX_WEB_SSL_VALID || i == IDX_WEB_SSL_VALID_1 {
                    1.0
                } else {
                    0.0
                };
                assert_eq!(fv.values[i], expected, "{url:?} slot {i}");
            }
            assert_eq!(fv.values[IDX_BRAND_MENTIONS], 0.0);
            assert_eq!(fv.values[IDX_BRAND_HIJACK], 0.0);
        }
    }

    #[test]
    fn structural_features() {
        let url = "http://a.b.c.example.top/x/y/z?a=1&b=2&c=3&d=4&e=5";
        let fv = extract(url);
        assert_eq!(fv.values[IDX_MULTIPLE_SUBDOMAINS], 1.0);
        assert_eq!(fv.values[IDX_MANY_PARAMS], 1.0);
        assert_eq!(fv.values[IDX_SUSPICIOUS_TLD], 1.0);
        assert_eq!(fv.values[IDX_PATH_SLASHES], 3.0);
        assert_eq!(fv.values[IDX_HOSTNAME_DOTS], 4.0);
        assert_eq!(fv.values[IDX_LONG_PATH], 0.0);

        let long = format!("http://h.com/{}", "a".repeat(60));
        assert_eq!(extract(&long).values[IDX_LONG_PATH], 1.0);
    }

    #[test]
    fn shortener_and_ip() {
        assert_eq!(extract("http://bit.ly/abc").values[IDX_SHORTENER], 1.0);
        assert_eq!(extract("http://192.168.0.1/login").values[IDX_IP_ADDRESS], 1.0);
        assert_eq!(extract("http://example.com").values[IDX_IP_ADDRESS], 0.0);
    }

    #[test]
    fn ratios_use_url_length() {
        let fv = extract("ab1e");
        assert_eq!(fv.values[IDX_CONSONANT_RATIO], 0.25);
        assert_eq!(fv.values[IDX_VOWEL_RATIO], 0.5);
        assert_eq!(fv.values[IDX_DIGIT_RATIO], 0.25);
        assert_eq!(fv.values[IDX_MEAN_TOKEN_LEN], 4.0);
    }

    #[test]
    fn only_decimal_digits_and_letters_are_counted() {
        // '½' and 'Ⅻ' are numeric but not decimal digits; 'Ⅻ' is not a letter either
        let fv = extract("http://x.com/½Ⅻ٣é");
        assert_eq!(fv.values[IDX_DIGITS], 1.0);
        assert_eq!(fv.values[IDX_LETTERS], 9.0);
        assert_eq!(fv.values[IDX_DIGIT_RATIO], 1.0 / 17.0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let url = "https://secure-login.example.online/verify?id=42&t=%20x";
        let a = extract(url);
        let b = FeatureExtractor::new().extract(url);
        let bits = |fv: &FeatureVector| fv.values.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }
}
