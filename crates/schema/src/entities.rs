use fitdesk_core::types::{Member, WorkoutSession};
use serde_json::Value;

use crate::record::{FieldErrors, FieldKind, FieldSpec, RecordSchema, MSG_MISSING};

/// Schema for the Member entity. Primary keys are caller-supplied, so `id`
/// is part of the inbound payload. `age` is required here even though the
/// storage column is nullable.
pub const MEMBER: RecordSchema = RecordSchema::new(
    "member",
    &[
        FieldSpec {
            name: "id",
            kind: FieldKind::Integer,
            required: true,
        },
        FieldSpec {
            name: "name",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "age",
            kind: FieldKind::Integer,
            required: true,
        },
    ],
);

/// Schema for the WorkoutSession entity. Same storage-nullable but
/// schema-required treatment for the date, time, and activity fields.
pub const WORKOUT_SESSION: RecordSchema = RecordSchema::new(
    "workout_session",
    &[
        FieldSpec {
            name: "session_id",
            kind: FieldKind::Integer,
            required: true,
        },
        FieldSpec {
            name: "member_id",
            kind: FieldKind::Integer,
            required: true,
        },
        FieldSpec {
            name: "session_date",
            kind: FieldKind::Date,
            required: true,
        },
        FieldSpec {
            name: "session_time",
            kind: FieldKind::Text,
            required: true,
        },
        FieldSpec {
            name: "activity",
            kind: FieldKind::Text,
            required: true,
        },
    ],
);

fn absent(field: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![MSG_MISSING.to_string()]);
    errors
}

/// Validate and coerce a Member payload.
pub fn load_member(payload: &Value) -> Result<Member, FieldErrors> {
    let record = MEMBER.load(payload)?;
    Ok(Member {
        id: record.int("id").ok_or_else(|| absent("id"))?,
        name: record
            .text("name")
            .ok_or_else(|| absent("name"))?
            .to_string(),
        age: record.int("age"),
    })
}

/// Validate and coerce a WorkoutSession payload.
pub fn load_workout_session(payload: &Value) -> Result<WorkoutSession, FieldErrors> {
    let record = WORKOUT_SESSION.load(payload)?;
    Ok(WorkoutSession {
        session_id: record
            .int("session_id")
            .ok_or_else(|| absent("session_id"))?,
        member_id: record
            .int("member_id")
            .ok_or_else(|| absent("member_id"))?,
        session_date: record.date("session_date"),
        session_time: record.text("session_time").map(str::to_string),
        activity: record.text("activity").map(str::to_string),
    })
}
