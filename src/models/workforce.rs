use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalty {
    pub id: Uuid,
    pub courier_id: Uuid,
    pub penalty_type: String,
    /// Monetary amount, two decimal places.
    pub amount: Decimal,
    pub reason: String,
}

/// One shift of one courier at one establishment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub courier_id: Uuid,
    pub establishment_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Shift excused.
    pub skip: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salary {
    pub id: Uuid,
    pub courier_id: Uuid,
    pub working_hours: u32,
    pub rate_per_hour: u32,
}

impl Salary {
    /// Total pay is derived, never stored.
    pub fn total_pay(&self) -> u64 {
        u64::from(self.working_hours) * u64::from(self.rate_per_hour)
    }
}
