//! Identifier conventions.
//!
//! Database names (`AUTHOR_ID`, `author_id`, `AuthorId`) are turned into
//! field names (`authorId`), type names (`Author`), constants (`AUTHOR_ID`)
//! and labels (`Author id`). These functions are pure; collision handling
//! lives in [`crate::session`].

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
});

/// Split a raw name into lower-cased words
fn words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in raw.split(|c: char| !c.is_ascii_alphanumeric()) {
        if chunk.is_empty() {
            continue;
        }
        let mixed_case = chunk.chars().any(|c| c.is_ascii_lowercase())
            && chunk.chars().any(|c| c.is_ascii_uppercase());
        if !mixed_case {
            words.push(chunk.to_ascii_lowercase());
            continue;
        }
        // camelCase / PascalCase boundaries; runs of capitals stay together (`bookISBN`)
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, c) in chars.iter().enumerate() {
            let boundary = i > 0
                && c.is_ascii_uppercase()
                && (chars[i - 1].is_ascii_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (chars[i - 1].is_ascii_uppercase()
                        && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase())));
            if boundary && !current.is_empty() {
                words.push(current.to_ascii_lowercase());
                current.clear();
            }
            current.push(*c);
        }
        if !current.is_empty() {
            words.push(current.to_ascii_lowercase());
        }
    }
    words
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

pub fn uncapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

fn guard_leading_digit(identifier: String) -> String {
    match identifier.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{identifier}"),
        None => "_".to_string(),
        _ => identifier,
    }
}

/// `AUTHOR_ID` → `authorId`
pub fn to_var_name(raw: &str) -> String {
    let words = words(raw);
    let mut name = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            name.push_str(word);
        } else {
            name.push_str(&capitalize(word));
        }
    }
    guard_leading_digit(name)
}

/// `book_author` → `BookAuthor`
pub fn to_type_name(raw: &str) -> String {
    let name: String = words(raw).iter().map(|w| capitalize(w)).collect();
    guard_leading_digit(name)
}

/// `in progress` → `IN_PROGRESS`
pub fn to_constant_name(raw: &str) -> String {
    words(raw)
        .iter()
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `first_name` → `First name`
pub fn humanize(raw: &str) -> String {
    capitalize(&words(raw).join(" "))
}

pub fn is_valid_identifier(value: &str) -> bool {
    IDENTIFIER.is_match(value)
}

/// English plural of the last word of an identifier
pub fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with('y')
        && !lower.ends_with("ay")
        && !lower.ends_with("ey")
        && !lower.ends_with("oy")
        && !lower.ends_with("uy")
    {
        format!("{}ies", &name[..name.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{name}es")
    } else {
        format!("{name}s")
    }
}

/// `authorId` → `author`; `None` when there is no trailing id
pub fn strip_id_suffix(name: &str) -> Option<String> {
    for suffix in ["Id", "ID"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return Some(stripped.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_names() {
        assert_eq!(to_var_name("AUTHOR_ID"), "authorId");
        assert_eq!(to_var_name("author_id"), "authorId");
        assert_eq!(to_var_name("authorId"), "authorId");
        assert_eq!(to_var_name("FirstName"), "firstName");
        assert_eq!(to_var_name("bookISBN"), "bookIsbn");
        assert_eq!(to_var_name("ID"), "id");
        assert_eq!(to_var_name("2fa_code"), "_2faCode");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(to_type_name("book_author"), "BookAuthor");
        assert_eq!(to_type_name("BOOK"), "Book");
        assert_eq!(to_type_name("orderLine"), "OrderLine");
    }

    #[test]
    fn test_constants_and_labels() {
        assert_eq!(to_constant_name("in progress"), "IN_PROGRESS");
        assert_eq!(to_constant_name("inProgress"), "IN_PROGRESS");
        assert_eq!(to_constant_name("1st"), "1ST");
        assert_eq!(humanize("first_name"), "First name");
        assert_eq!(humanize("AUTHOR_ID"), "Author id");
        assert!(is_valid_identifier("DRAFT"));
        assert!(is_valid_identifier("_x1"));
        assert!(!is_valid_identifier("in progress"));
        assert!(!is_valid_identifier("1A"));
    }

    #[test]
    fn test_plurals() {
        assert_eq!(pluralize("book"), "books");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("branch"), "branches");
    }

    #[test]
    fn test_strip_id_suffix() {
        assert_eq!(strip_id_suffix("authorId").as_deref(), Some("author"));
        assert_eq!(strip_id_suffix("ownerID").as_deref(), Some("owner"));
        assert_eq!(strip_id_suffix("Id"), None);
        assert_eq!(strip_id_suffix("author"), None);
        assert_eq!(strip_id_suffix("paid"), None);
    }
}
