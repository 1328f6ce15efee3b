use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

/// A savings goal as returned by `/goals`.
///
/// Decoding goes through `RawSavingsGoal`, so a payload may carry either key
/// spelling or both; serialization always emits snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSavingsGoal")]
pub struct SavingsGoal {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: NaiveDate,
    pub status: GoalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
struct RawSavingsGoal {
    id: u64,
    #[serde(default)]
    user_id: Option<u64>,
    #[serde(default, rename = "userId")]
    user_id_camel: Option<u64>,
    name: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    target_amount: Option<f64>,
    #[serde(default, rename = "targetAmount", deserialize_with = "lenient::amount")]
    target_amount_camel: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    current_amount: Option<f64>,
    #[serde(default, rename = "currentAmount", deserialize_with = "lenient::amount")]
    current_amount_camel: Option<f64>,
    #[serde(default, deserialize_with = "lenient::date")]
    target_date: Option<NaiveDate>,
    #[serde(default, rename = "targetDate", deserialize_with = "lenient::date")]
    target_date_camel: Option<NaiveDate>,
    #[serde(default)]
    status: GoalStatus,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default, rename = "createdAt")]
    created_at_camel: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default, rename = "updatedAt")]
    updated_at_camel: Option<String>,
}

// snake_case wins when both spellings are present.
impl TryFrom<RawSavingsGoal> for SavingsGoal {
    type Error = String;

    fn try_from(raw: RawSavingsGoal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            user_id: raw.user_id.or(raw.user_id_camel),
            name: raw.name,
            target_amount: raw
                .target_amount
                .or(raw.target_amount_camel)
                .ok_or("missing field `target_amount`")?,
            current_amount: raw.current_amount.or(raw.current_amount_camel).unwrap_or_default(),
            target_date: raw
                .target_date
                .or(raw.target_date_camel)
                .ok_or("missing field `target_date`")?,
            status: raw.status,
            created_at: raw.created_at.or(raw.created_at_camel),
            updated_at: raw.updated_at.or(raw.updated_at_camel),
        })
    }
}

impl SavingsGoal {
    /// Percent saved, clamped to 100.
    pub fn progress(&self) -> f64 {
        progress(self.current_amount, self.target_amount)
    }

    /// Whole days from `today` to the target date; negative when overdue.
    pub fn days_remaining_from(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days()
    }

    pub fn days_remaining(&self) -> i64 {
        self.days_remaining_from(Local::now().date_naive())
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.days_remaining_from(today) < 0
    }

    pub fn is_reached(&self) -> bool {
        self.progress() >= 100.0
    }
}

/// `current / target * 100`, capped at 100. A zero target yields 0.
pub fn progress(current: f64, target: f64) -> f64 {
    if target == 0.0 {
        return 0.0;
    }
    (current / target * 100.0).min(100.0)
}

pub fn total_saved(goals: &[SavingsGoal]) -> f64 {
    goals.iter().map(|goal| goal.current_amount).sum()
}

/// Request payload for `POST /goals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoal {
    pub name: String,
    pub target_amount: f64,
    pub target_date: NaiveDate,
}

/// Request payload for `PUT /goals/:id`. Only the fields present are sent;
/// the server leaves omitted fields unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateGoal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
}

impl UpdateGoal {
    pub fn current_amount(amount: f64) -> Self {
        Self {
            current_amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn status(status: GoalStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
