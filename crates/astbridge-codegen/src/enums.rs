//! Enumeration item normalization.
//!
//! Items such as `BO_Add`, `BO_Sub`, `BO_Mul` lose their shared `BO_` prefix
//! and read as `Add`, `Sub`, `Mul` on their own enum.

use crate::writer::CodeWriter;
use astbridge_core::Enumeration;
use astbridge_core::naming::{NameKind, to_upper_camel_case};
use std::collections::HashSet;
use tracing::trace;

/// Minimum number of items sharing a prefix before it is stripped.
pub const PREFIX_THRESHOLD: usize = 3;

/// Prefix of an item name up to and including its first underscore.
///
/// A second underscore directly after the first belongs to the prefix too.
pub fn item_prefix(name: &str) -> Option<&str> {
    let underscore = name.find('_')?;
    let mut end = underscore + 1;
    if name[end..].starts_with('_') {
        end += 1;
    }
    Some(&name[..end])
}

/// Strip the prefix shared by the enum's items.
///
/// The prefix is taken from the first item. Nothing changes unless at least
/// [`PREFIX_THRESHOLD`] items start with it; otherwise items without the
/// prefix are ignored and the rest are renamed. Returns whether the enum was
/// rewritten.
pub fn strip_item_prefix(enumeration: &mut Enumeration) -> bool {
    let Some(first) = enumeration.items.first() else {
        return false;
    };
    let Some(prefix) = item_prefix(&first.name).map(str::to_string) else {
        return false;
    };

    let sharing = enumeration
        .items
        .iter()
        .filter(|item| item.name.starts_with(&prefix))
        .count();
    if sharing < PREFIX_THRESHOLD {
        return false;
    }

    let mut seen = HashSet::new();
    for item in &mut enumeration.items {
        let Some(rest) = item.name.strip_prefix(&prefix) else {
            trace!(
                enumeration = %enumeration.name,
                item = %item.name,
                "Ignoring enum item without shared prefix"
            );
            item.ignored = true;
            continue;
        };

        item.name = to_upper_camel_case(rest, NameKind::EnumItem);
        if !item.ignored && !seen.insert(item.name.clone()) {
            trace!(
                enumeration = %enumeration.name,
                item = %item.name,
                "Ignoring duplicate enum item"
            );
            item.ignored = true;
        }
    }

    true
}

/// Write the generated items of an enum body, one per line.
///
/// Values are spelled out only where they break the implicit sequence, so
/// ignored items never shift the values of the items after them.
pub(crate) fn write_items(w: &mut CodeWriter, enumeration: &Enumeration) {
    let items: Vec<_> = enumeration.generated_items().collect();
    let mut expected = 0;
    for (i, item) in items.iter().enumerate() {
        let separator = if i + 1 < items.len() { "," } else { "" };
        if item.value == expected {
            w.line(format!("{}{separator}", item.name));
        } else {
            w.line(format!("{} = {}{separator}", item.name, item.value));
        }
        expected = item.value.wrapping_add(1);
    }
}
