use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Longest custodian fragment used in a generated file name, in characters.
const MAX_NAME_CHARS: usize = 60;

static UNSAFE_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s.-]+").expect("BUG: invalid UNSAFE_CHARS_RE regex literal")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("BUG: invalid WHITESPACE_RE regex literal"));

/// Makes `name` safe to use as part of a file name.
///
/// Trims the name, drops everything except word characters, whitespace, `.`
/// and `-`, then turns each remaining run of whitespace into a single `_`.
/// Whitespace left behind by a dropped character is kept, so `"a !"` becomes
/// `"a_"`. Returns `"Unknown"` when nothing is left.
pub fn sanitize_filename(name: &str) -> String {
    let kept = UNSAFE_CHARS_RE.replace_all(name.trim(), "");
    let joined = WHITESPACE_RE.replace_all(&kept, "_");
    if joined.is_empty() {
        "Unknown".to_string()
    } else {
        joined.into_owned()
    }
}

/// `DA2062_<custodian>_<YYYYMMDD>.pdf`
pub fn default_output_name(custodian: &str, date: NaiveDate) -> String {
    let name: String = sanitize_filename(custodian).chars().take(MAX_NAME_CHARS).collect();
    format!("DA2062_{}_{}.pdf", name, date.format("%Y%m%d"))
}
