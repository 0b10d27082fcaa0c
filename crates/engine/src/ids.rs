//! Identifier repair.
//!
//! The upstream service emits composite identifiers (`<uuid>_<suffix>`) for
//! some deleted or special entities. Every `*id` column goes through
//! [`repair_id`] before it is used as a lookup key.

use uuid::Uuid;

/// Returns `value` unchanged if it is a well-formed UUID, otherwise its first
/// `_`-delimited component.
///
/// A value that is still not a UUID after the split is returned as is: it
/// simply fails to match any dimension row later on.
///
/// ```rust
/// use engine::repair_id;
///
/// let id = "3f1c2a9e-8b7d-4c6e-9a5f-1b2c3d4e5f60";
/// assert_eq!(repair_id(id), id);
/// assert_eq!(repair_id("3f1c2a9e-8b7d-4c6e-9a5f-1b2c3d4e5f60_2024-01-05"), id);
/// assert_eq!(repair_id("A1"), "A1");
/// ```
#[must_use]
pub fn repair_id(value: &str) -> &str {
    if Uuid::try_parse(value).is_ok() {
        return value;
    }
    value.split('_').next().unwrap_or(value)
}

pub(crate) fn repair_owned(value: &str) -> String {
    repair_id(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "0b6f4a7c-1d2e-4f3a-8b9c-0d1e2f3a4b5c";

    #[test]
    fn valid_uuid_is_kept() {
        assert_eq!(repair_id(UUID), UUID);
    }

    #[test]
    fn composite_is_reduced_to_first_component() {
        let composite = format!("{UUID}_extra");
        assert_eq!(repair_id(&composite), UUID);

        let many = format!("{UUID}_2024-01-05_1");
        assert_eq!(repair_id(&many), UUID);
    }

    #[test]
    fn non_uuid_without_separator_is_unchanged() {
        assert_eq!(repair_id("A1"), "A1");
        assert_eq!(repair_id(""), "");
    }

    #[test]
    fn non_uuid_composite_keeps_first_component() {
        assert_eq!(
            repair_id("GInternal_Master_Category_sentinel"),
            "GInternal"
        );
        assert_eq!(repair_id("_leading"), "");
    }

    #[test]
    fn repair_is_idempotent() {
        let composite = format!("{UUID}_extra");
        let once = repair_id(&composite);
        assert_eq!(repair_id(once), once);
    }
}
