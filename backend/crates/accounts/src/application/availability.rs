//! Availability Use Case
//!
//! Weekly consultation slots, managed by psychologists only.

use std::sync::Arc;

use chrono::NaiveTime;

use crate::domain::entity::availability_slot::AvailabilitySlot;
use crate::domain::repository::AccountsRepository;
use crate::domain::value_object::ids::{SlotId, UserId};
use crate::error::{AccountsError, AccountsResult};

/// New slot as submitted
pub struct NewSlotInput {
    /// 0 = Monday .. 6 = Sunday
    pub weekday: i16,
    /// `HH:MM`
    pub start_time: String,
    pub end_time: String,
}

pub struct AvailabilityUseCase<R>
where
    R: AccountsRepository,
{
    repo: Arc<R>,
}

impl<R> AvailabilityUseCase<R>
where
    R: AccountsRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, user_id: &UserId) -> AccountsResult<Vec<AvailabilitySlot>> {
        self.require_psychologist(user_id).await?;
        self.repo.list_slots(user_id).await
    }

    pub async fn add(&self, user_id: &UserId, input: NewSlotInput) -> AccountsResult<AvailabilitySlot> {
        self.require_psychologist(user_id).await?;

        let weekday = AvailabilitySlot::weekday_from_index(input.weekday)?;
        let start_time = parse_time(&input.start_time)?;
        let end_time = parse_time(&input.end_time)?;
        let slot = AvailabilitySlot::new(*user_id, weekday, start_time, end_time)?;

        self.repo.create_slot(&slot).await?;
        Ok(slot)
    }

    pub async fn remove(&self, user_id: &UserId, slot_id: &SlotId) -> AccountsResult<()> {
        self.require_psychologist(user_id).await?;

        if !self.repo.delete_slot(user_id, slot_id).await? {
            return Err(AccountsError::NotFound("Slot not found".to_string()));
        }
        Ok(())
    }

    async fn require_psychologist(&self, user_id: &UserId) -> AccountsResult<()> {
        let is_psychologist = self
            .repo
            .find_profile(user_id)
            .await?
            .is_some_and(|profile| profile.role.is_psychologist());

        if is_psychologist {
            Ok(())
        } else {
            Err(AccountsError::Forbidden(
                "Only psychologists manage availability".to_string(),
            ))
        }
    }
}

/// `HH:MM`, 24-hour clock
fn parse_time(raw: &str) -> AccountsResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AccountsError::Validation(format!("Invalid time '{raw}', expected HH:MM")))
}
