//! Schema versioning for JSON command output.

/// Version stamped into every JSON command envelope.
///
/// `metadata.json` is a bare array of window records and carries no version.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.1.0";
