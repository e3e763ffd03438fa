//! Tag resolution for YAML scalars.
//!
//! Plain scalars are resolved the way Go-ecosystem YAML decoders do it, which
//! is what chart tooling expects: YAML 1.2 core schema, plus timestamps.
//! Legacy YAML 1.1 spellings such as `yes`/`no` stay strings.

use once_cell::sync::Lazy;
use regex::Regex;

/// Short forms of the core tags.
pub mod tags {
    pub const NULL: &str = "!!null";
    pub const BOOL: &str = "!!bool";
    pub const STR: &str = "!!str";
    pub const INT: &str = "!!int";
    pub const FLOAT: &str = "!!float";
    pub const TIMESTAMP: &str = "!!timestamp";
    pub const SEQ: &str = "!!seq";
    pub const MAP: &str = "!!map";
}

const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?$").expect("valid float regex")
});

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(([Tt][0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}(\.[0-9]+)?(Z|[-+][0-9]{2}:[0-9]{2}))|( [0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}(\.[0-9]+)?))?$",
    )
    .expect("valid timestamp regex")
});

/// Resolve the tag of an untagged plain scalar.
pub fn resolve_plain(raw: &str) -> &'static str {
    match raw {
        "" | "~" | "null" | "Null" | "NULL" => return tags::NULL,
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => return tags::BOOL,
        _ if special_float(raw).is_some() => return tags::FLOAT,
        _ => {}
    }

    let first = raw.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() && TIMESTAMP_RE.is_match(raw) {
        return tags::TIMESTAMP;
    }
    if first.is_ascii_digit() || matches!(first, '+' | '-' | '.') {
        if parse_int(raw).is_some() || parse_uint(raw).is_some() {
            return tags::INT;
        }
        if FLOAT_RE.is_match(&strip_underscores(raw)) {
            return tags::FLOAT;
        }
    }
    tags::STR
}

/// Normalize an explicit tag into its short form.
///
/// `!!str` and `!<tag:yaml.org,2002:str>` both become `!!str`; the
/// non-specific tag `!` forces a string.
pub fn normalize_tag(handle: &str, suffix: &str) -> String {
    if handle == "!!" || handle == CORE_TAG_PREFIX {
        return format!("!!{suffix}");
    }
    if let Some(rest) = suffix.strip_prefix(CORE_TAG_PREFIX) {
        return format!("!!{rest}");
    }
    if handle == "!" && suffix.is_empty() {
        return tags::STR.to_string();
    }
    format!("{handle}{suffix}")
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Parse a YAML integer: optional sign, `0x`/`0o`/`0b` prefixes, a bare
/// leading `0` for octal, underscores ignored.
pub fn parse_int(raw: &str) -> Option<i64> {
    parse_wide_int(raw).and_then(|value| i64::try_from(value).ok())
}

/// Parse a YAML integer above `i64::MAX` that still fits `u64`.
pub fn parse_uint(raw: &str) -> Option<u64> {
    parse_wide_int(raw).and_then(|value| u64::try_from(value).ok())
}

fn parse_wide_int(raw: &str) -> Option<i128> {
    let plain = strip_underscores(raw);
    let (negative, digits) = match plain.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, plain.strip_prefix('+').unwrap_or(&plain)),
    };

    let (radix, body) = if let Some(body) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, body)
    } else if let Some(body) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        (8, body)
    } else if let Some(body) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, body)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    // from_str_radix would accept a second sign
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(body, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a YAML float, including the `.inf` and `.nan` spellings.
pub fn parse_float(raw: &str) -> Option<f64> {
    if let Some(special) = special_float(raw) {
        return Some(special);
    }
    let plain = strip_underscores(raw);
    if FLOAT_RE.is_match(&plain) || parse_int(raw).is_some() {
        return plain.parse::<f64>().ok().or_else(|| parse_int(raw).map(|i| i as f64));
    }
    None
}

fn special_float(raw: &str) -> Option<f64> {
    match raw {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => None,
    }
}

fn strip_underscores(raw: &str) -> String {
    raw.chars().filter(|c| *c != '_').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_core_scalars() {
        assert_eq!(resolve_plain(""), tags::NULL);
        assert_eq!(resolve_plain("~"), tags::NULL);
        assert_eq!(resolve_plain("True"), tags::BOOL);
        assert_eq!(resolve_plain("yes"), tags::STR);
        assert_eq!(resolve_plain("42"), tags::INT);
        assert_eq!(resolve_plain("-0x1F"), tags::INT);
        assert_eq!(resolve_plain("1_000"), tags::INT);
        assert_eq!(resolve_plain("3.14"), tags::FLOAT);
        assert_eq!(resolve_plain("1e3"), tags::FLOAT);
        assert_eq!(resolve_plain(".5"), tags::FLOAT);
        assert_eq!(resolve_plain("-.inf"), tags::FLOAT);
        assert_eq!(resolve_plain("nginx"), tags::STR);
        assert_eq!(resolve_plain("1.2.3"), tags::STR);
    }

    #[test]
    fn test_resolve_timestamps() {
        assert_eq!(resolve_plain("2001-12-14"), tags::TIMESTAMP);
        assert_eq!(resolve_plain("2001-12-14t21:59:43.10-05:00"), tags::TIMESTAMP);
        assert_eq!(resolve_plain("2001-12-14 21:59:43.10"), tags::TIMESTAMP);
        assert_eq!(resolve_plain("2001-12"), tags::STR);
    }

    #[test]
    fn test_leading_zero_is_octal() {
        assert_eq!(parse_int("0755"), Some(493));
        assert_eq!(parse_int("0"), Some(0));
        // not valid octal, but still a float literal
        assert_eq!(parse_int("09"), None);
        assert_eq!(resolve_plain("09"), tags::FLOAT);
    }

    #[test]
    fn test_parse_int_rejects_double_sign() {
        assert_eq!(parse_int("-+1"), None);
        assert_eq!(parse_int("+"), None);
        assert_eq!(parse_int("0b101"), Some(5));
    }

    #[test]
    fn test_unsigned_range_is_still_int() {
        assert_eq!(resolve_plain("18446744073709551615"), tags::INT);
        assert_eq!(parse_int("18446744073709551615"), None);
        assert_eq!(parse_uint("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_uint("-1"), None);
        assert_eq!(resolve_plain("18446744073709551616"), tags::FLOAT);
        assert_eq!(resolve_plain("-9223372036854775809"), tags::FLOAT);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("!!", "str"), "!!str");
        assert_eq!(normalize_tag("tag:yaml.org,2002:", "int"), "!!int");
        assert_eq!(normalize_tag("", "tag:yaml.org,2002:map"), "!!map");
        assert_eq!(normalize_tag("!", "path"), "!path");
        assert_eq!(normalize_tag("!", ""), "!!str");
    }
}
