//! Availability Slot Entity
//!
//! A weekly time range in which a psychologist accepts consultations.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use kernel::error::app_error::{AppError, AppResult, OptionExt};
use kernel::error::kind::ErrorKind;

use crate::domain::value_object::ids::{SlotId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySlot {
    pub slot_id: SlotId,
    pub user_id: UserId,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl AvailabilitySlot {
    /// `start_time` must be strictly before `end_time`
    pub fn new(
        user_id: UserId,
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<Self> {
        if start_time >= end_time {
            return Err(AppError::bad_request("Start time must be before end time"));
        }

        Ok(Self {
            slot_id: SlotId::new(),
            user_id,
            weekday,
            start_time,
            end_time,
            created_at: Utc::now(),
        })
    }

    /// 0 = Monday .. 6 = Sunday
    pub fn weekday_index(&self) -> i16 {
        self.weekday.num_days_from_monday() as i16
    }

    pub fn weekday_from_index(index: i16) -> AppResult<Weekday> {
        u8::try_from(index)
            .ok()
            .and_then(|i| Weekday::try_from(i).ok())
            .ok_or_app_err(
                ErrorKind::BadRequest,
                "Weekday must be between 0 (Monday) and 6 (Sunday)",
            )
    }

    /// Sort key: weekday, then start time
    pub fn sort_key(&self) -> (i16, NaiveTime) {
        (self.weekday_index(), self.start_time)
    }
}
