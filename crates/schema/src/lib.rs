//! Declarative record schemas for inbound payloads.
//!
//! A [`RecordSchema`] describes one record shape as a list of
//! (name, kind, required) field specs. Loading a payload either yields a
//! coerced [`Record`] or a map of field-level error messages that the HTTP
//! layer returns verbatim as a 400 body.

pub mod entities;
pub mod record;

pub use entities::{load_member, load_workout_session, MEMBER, WORKOUT_SESSION};
pub use record::{FieldErrors, FieldKind, FieldSpec, FieldValue, Record, RecordSchema};
