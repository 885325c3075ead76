//! Typed entities built from cached field maps.
//!
//! Each entity reads a fixed set of known fields. Unknown fields are ignored
//! and a known field holding a value of the wrong shape leaves the default in
//! place.

pub mod guild;
pub mod user;

pub use guild::GuildData;
pub use user::UserData;

use tracing::debug;

use crate::store::{Domain, FieldMap, FieldValue};

/// An entity kind stored under a fixed domain.
pub trait Entity: Sized {
    /// Domain the entity lives in.
    const DOMAIN: Domain;

    /// Storage field names the entity reads.
    const FIELDS: &'static [&'static str];

    /// Build the entity. `id` is the requested item id; any `id` in `fields`
    /// is ignored.
    fn from_fields(id: &str, fields: &FieldMap) -> Self;
}

pub(crate) fn read_string(fields: &FieldMap, name: &str) -> Option<String> {
    fields.get(name).map(FieldValue::to_string)
}

pub(crate) fn read_bool(fields: &FieldMap, name: &str) -> Option<bool> {
    read_with(fields, name, "bool", FieldValue::as_bool)
}

pub(crate) fn read_i64(fields: &FieldMap, name: &str) -> Option<i64> {
    read_with(fields, name, "integer", FieldValue::as_i64)
}

fn read_with<T>(
    fields: &FieldMap,
    name: &str,
    expected: &str,
    convert: impl Fn(&FieldValue) -> Option<T>,
) -> Option<T> {
    let value = fields.get(name)?;
    let converted = convert(value);
    if converted.is_none() {
        debug!("Ignoring field {} = {:?}: expected {}", name, value, expected);
    }
    converted
}
