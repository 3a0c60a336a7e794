//! Parsing of client version strings.
//!
//! A full version string is a sequence of `_`-separated tokens mixing a
//! launcher revision, a region tag and a game version, for example
//! `1_os_3.9` or `7.9_gf_pc_beta`. Two projections matter:
//!
//! * the numeric game version (`3.9` becomes `39`), which selects the
//!   AES key used for the dispatch payload, and
//! * the region (`os`, `gf_pc_beta`, ...), which selects the upstream
//!   dispatch domain and the resource URL tables.

/// Extracts the numeric game version from a full version string.
///
/// Tokens are scanned left to right and the last one shaped like
/// `major` or `major.minor` wins; the result is `major * 10 + minor`.
/// Returns `None` when no token is numeric.
pub fn extract_version_number(version_key: &str) -> Option<u32> {
    let mut found = None;
    for token in version_key.split('_') {
        if let Some(number) = parse_numeric_token(token) {
            found = Some(number);
        }
    }
    found
}

fn parse_numeric_token(token: &str) -> Option<u32> {
    let mut parts = token.splitn(2, '.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = match parts.next() {
        Some(minor) => minor.parse().ok()?,
        None => 0,
    };
    Some(major * 10 + minor)
}

/// Extracts the region from a full version string.
///
/// The region is the join of every `_`-separated token that does not
/// start with a digit, lowercased. `1_os_3.9` yields `os` and
/// `7.9_gf_pc_beta` yields `gf_pc_beta`. Returns `None` when every
/// token is numeric.
pub fn extract_region(version_key: &str) -> Option<String> {
    let tokens: Vec<&str> = version_key
        .split('_')
        .filter(|token| !token.is_empty() && !token.starts_with(|c: char| c.is_ascii_digit()))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join("_").to_ascii_lowercase())
    }
}

/// Maps a region to the upstream dispatch domain serving it.
pub fn region_domain(region: &str) -> Option<&'static str> {
    match region {
        "gf_pc_beta" => Some("outer-dp-beta-release.bh3.com"),
        "gf" | "gf_pc" => Some("outer-dp-pc01.bh3.com"),
        "os" | "os_pc" => Some("outer-dp-overseas01.honkaiimpact3.com"),
        "global" | "global_pc" => Some("outer-dp-usa01.honkaiimpact3.com"),
        "jp" | "jp_pc" => Some("outer-dp-jp01.honkaiimpact3.com"),
        "kr" | "kr_pc" => Some("outer-dp-kr01.honkaiimpact3.com"),
        "tw" | "tw_pc" => Some("outer-dp-asia01.honkaiimpact3.com"),
        _ => None,
    }
}
