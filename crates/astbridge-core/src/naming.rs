//! Naming convention utilities for code generation.
//!
//! Native names keep the source spelling in lower camel case (`cond`,
//! `isConstexpr`); managed names use upper camel case (`Cond`,
//! `IsConstexpr`).
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `add_assign` | [`to_upper_camel_case`] | `AddAssign` |
//! | `Cond` | [`to_lower_camel_case`] | `cond` |
//! | `cond` | [`native_getter`] | `getCond` |
//! | `isConstexpr` | [`native_getter`] | `isConstexpr` |

/// Which kind of declaration a name belongs to.
///
/// Enum items keep a leading acronym intact (`LAnd` stays `LAnd` rather than
/// being split into more capitals in a row).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Declaration,
    EnumItem,
}

/// Convert a name to UpperCamelCase.
///
/// # Examples
///
/// ```
/// use astbridge_core::naming::{NameKind, to_upper_camel_case};
///
/// assert_eq!(to_upper_camel_case("add_assign", NameKind::EnumItem), "AddAssign");
/// assert_eq!(to_upper_camel_case("cond", NameKind::Declaration), "Cond");
/// ```
pub fn to_upper_camel_case(name: &str, kind: NameKind) -> String {
    convert_case(name, kind, true)
}

/// Convert a name to lowerCamelCase.
///
/// # Examples
///
/// ```
/// use astbridge_core::naming::{NameKind, to_lower_camel_case};
///
/// assert_eq!(to_lower_camel_case("Children", NameKind::Declaration), "children");
/// ```
pub fn to_lower_camel_case(name: &str, kind: NameKind) -> String {
    convert_case(name, kind, false)
}

fn convert_case(name: &str, kind: NameKind, upper: bool) -> String {
    if !name.chars().any(char::is_alphabetic) {
        return name.to_string();
    }

    let mut chars: Vec<char> = name.chars().collect();
    remove_underscores(&mut chars);

    let Some(first) = chars.first().copied() else {
        return String::new();
    };
    let second_is_upper = chars.get(1).is_some_and(|c| c.is_uppercase());
    if chars.len() == 1 || !second_is_upper || kind != NameKind::EnumItem {
        chars[0] = if upper {
            first.to_uppercase().next().unwrap_or(first)
        } else {
            first.to_lowercase().next().unwrap_or(first)
        };
    }

    chars.into_iter().collect()
}

/// Drop word-separating underscores, capitalizing the following character.
///
/// An underscore survives when removing it would merge two capitals or two
/// digits, or when it precedes a lowercase letter in a name that already
/// starts with a capital.
fn remove_underscores(chars: &mut Vec<char>) {
    let mut i = chars.len();
    while i > 0 {
        i -= 1;
        if chars[i] != '_' {
            continue;
        }

        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let first_is_upper = chars.first().is_some_and(|c| c.is_uppercase());

        let keeps_lowercase = first_is_upper && next.is_some_and(char::is_lowercase);
        let keeps_run = prev.is_some_and(char::is_uppercase)
            || (prev.is_some_and(|c| c.is_ascii_digit())
                && next.is_some_and(|c| c.is_ascii_digit()));
        if keeps_lowercase || keeps_run {
            continue;
        }

        if let Some(c) = next {
            chars[i + 1] = c.to_uppercase().next().unwrap_or(c);
        }
        chars.remove(i);
    }
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use astbridge_core::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Name of the native getter backing a property.
///
/// Predicate-style properties (`isX`, `hasX`, ...) are their own getter;
/// everything else is read through `getX`.
pub fn native_getter(property: &str) -> String {
    const PREDICATE_PREFIXES: &[&str] = &["is", "has", "can", "refers", "uses"];

    let is_predicate = PREDICATE_PREFIXES.iter().any(|prefix| {
        property
            .strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_uppercase)
    });

    if is_predicate {
        property.to_string()
    } else {
        format!("get{}", capitalize(property))
    }
}

/// Remove `suffix` from the end of `name` if present.
pub fn remove_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}
