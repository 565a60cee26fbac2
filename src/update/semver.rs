use std::cmp::Ordering;

use semver::Version;

/// Strip a leading `v`/`V` from a release tag ("v1.2.0" -> "1.2.0")
pub fn normalize_version(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

/// Parse a version string into a semver::Version plus any numeric segments
/// past the patch level.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros and
/// strips a leading 'v'.
///
/// Examples:
/// - "1" -> (Version(1, 0, 0), [])
/// - "v1.2.3" -> (Version(1, 2, 3), [])
/// - "1.2.0.1" -> (Version(1, 2, 0), [1])
fn parse_version(version: &str) -> Option<(Version, Vec<u64>)> {
    let version = normalize_version(version);
    let core_len = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_len);

    let mut segments: Vec<&str> = core.split('.').collect();
    let extra = segments
        .split_off(segments.len().min(3))
        .into_iter()
        .map(|segment| segment.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    segments.resize(3, "0");

    let parsed = Version::parse(&format!("{}{suffix}", segments.join("."))).ok()?;
    Some((parsed, extra))
}

/// Compare two version strings under semantic-version ordering.
///
/// Segments past the patch level compare numerically, missing ones counting
/// as zero, so "1.2.0" < "1.2.0.1" and "1.2" == "1.2.0.0". Pre-release
/// suffixes break ties after all numeric segments.
///
/// Returns `None` when either side cannot be parsed.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let (a, a_extra) = parse_version(a)?;
    let (b, b_extra) = parse_version(b)?;

    let len = a_extra.len().max(b_extra.len());
    let padded = |extra: &[u64]| -> Vec<u64> {
        (0..len).map(|i| extra.get(i).copied().unwrap_or(0)).collect()
    };

    Some(
        (a.major, a.minor, a.patch)
            .cmp(&(b.major, b.minor, b.patch))
            .then_with(|| padded(&a_extra).cmp(&padded(&b_extra)))
            .then_with(|| a.cmp(&b)),
    )
}
