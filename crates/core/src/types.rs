use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered member of the fitness center.
///
/// `age` is nullable in storage even though the inbound schema requires it;
/// rows written through other channels may carry a NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
}

/// A single workout session belonging to exactly one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub session_id: i64,
    pub member_id: i64,
    pub session_date: Option<NaiveDate>,
    pub session_time: Option<String>,
    pub activity: Option<String>,
}
