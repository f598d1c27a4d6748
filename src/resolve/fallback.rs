//! Three-level fallback primitive.
//!
//! Every resolved field is an ordered list of tiers: explicit override,
//! then an intermediate source (global mapping, entity-level default, raw
//! metadata), then a convention. The first tier that yields a value wins.

/// First non-`None` of `explicit`, `intermediate`, else `default`
pub fn fallback<T>(explicit: Option<T>, intermediate: Option<T>, default: T) -> T {
    explicit.or(intermediate).unwrap_or(default)
}

/// Like [`fallback`] with a lazily computed convention
pub fn fallback_with<T>(explicit: Option<T>, intermediate: Option<T>, default: impl FnOnce() -> T) -> T {
    explicit.or(intermediate).unwrap_or_else(default)
}

/// First value that is present and not blank
pub fn first_non_empty<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        assert_eq!(fallback(Some(1), Some(2), 3), 1);
        assert_eq!(fallback(None, Some(2), 3), 2);
        assert_eq!(fallback(None, None, 3), 3);
    }

    #[test]
    fn test_explicit_wins_for_every_value() {
        for explicit in [-5, 0, 7, i32::MAX] {
            assert_eq!(fallback(Some(explicit), Some(99), 100), explicit);
            assert_eq!(fallback_with(Some(explicit), None, || unreachable!()), explicit);
        }
    }

    #[test]
    fn test_first_non_empty_skips_blanks() {
        assert_eq!(first_non_empty([None, Some(""), Some("  "), Some("x"), Some("y")]), Some("x"));
        assert_eq!(first_non_empty([None, Some("")]), None);
    }
}
