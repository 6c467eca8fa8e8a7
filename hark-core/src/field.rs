//! Field resolution.
//!
//! Filters name event fields in one of three ways:
//!
//! 1. The alias [`FILENAME_ALIAS`], which reaches into the attachment at
//!    `file.name`.
//! 2. A dotted path such as `message.edited.user`, walked one object at a
//!    time.
//! 3. A plain top-level key.
//!
//! The wire format nests some attributes one level down; resolution lets
//! filters match on them without knowing where they live.

use crate::event::Event;
use serde_json::Value;

/// Virtual field resolving to the name of the attached file.
pub const FILENAME_ALIAS: &str = "filename";

/// Separator between segments of a nested field path.
pub const PATH_SEPARATOR: char = '.';

/// Resolve `field` inside `event`.
///
/// Returns `None` when any step of the path is missing or when an
/// intermediate step is not an object.
pub fn resolve<'e>(event: &'e Event, field: &str) -> Option<&'e Value> {
    let fields = event.fields();

    if field == FILENAME_ALIAS {
        return fields.get("file")?.get("name");
    }

    if field.contains(PATH_SEPARATOR) {
        let mut segments = field.split(PATH_SEPARATOR);
        let mut current = fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        return Some(current);
    }

    fields.get(field)
}

/// Whether a resolved value counts as present.
///
/// `null`, `false` and the empty string are treated the same as a missing
/// field.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

/// Resolve `field` and keep it only if it is present.
pub fn resolve_present<'e>(event: &'e Event, field: &str) -> Option<&'e Value> {
    resolve(event, field).filter(|value| is_present(value))
}
