use serde::{Deserialize, Serialize};

use super::range::RangeValue;
use crate::drift::{self, Converge, FieldDrift};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActiveOn {
    #[default]
    Always,
    WorkingHours,
    CustomTimeframe,
    CustomRecurring,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A recurring weekly window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecurringWindow {
    pub from: String,
    pub to: String,
    pub days: Vec<Weekday>,
}

/// When a rule is in force. Defaults to always.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Schedule {
    pub active_on: ActiveOn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_timeframe: Option<RangeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_recurring: Option<RecurringWindow>,
}

impl Schedule {
    pub fn is_always(&self) -> bool {
        self.active_on == ActiveOn::Always
            && self.custom_timeframe.is_none()
            && self.custom_recurring.is_none()
    }
}

impl Converge for Schedule {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        drift::scalar(&self.active_on, &observed.active_on, &format!("{path}.active_on"), out);
        drift::scalar(
            &self.custom_timeframe,
            &observed.custom_timeframe,
            &format!("{path}.custom_timeframe"),
            out,
        );
        drift::scalar(
            &self.custom_recurring,
            &observed.custom_recurring,
            &format!("{path}.custom_recurring"),
            out,
        );
    }
}
