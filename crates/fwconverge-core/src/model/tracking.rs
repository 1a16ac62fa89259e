use serde::{Deserialize, Serialize};

use super::reference::Reference;
use super::tristate::TriState;
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
pub enum AlertFrequency {
    Immediate,
    Hourly,
    #[default]
    Daily,
    Weekly,
}

/// Event logging and alerting for matches of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tracking {
    pub event: TrackingEvent,
    /// Left out by the operator means "remote defaults"; the payload
    /// builder fills them in because the remote requires the sub-object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<TrackingAlert>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingEvent {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingAlert {
    pub enabled: bool,
    pub frequency: AlertFrequency,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub subscription_group: TriState<Reference>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub webhook: TriState<Reference>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub mailing_list: TriState<Reference>,
}

impl Tracking {
    /// Event and alert both off, no alert targets.
    pub fn is_default(&self) -> bool {
        !self.event.enabled && self.alert.as_ref().is_none_or(TrackingAlert::is_default)
    }
}

impl TrackingAlert {
    pub fn is_default(&self) -> bool {
        !self.enabled
            && self.frequency == AlertFrequency::Daily
            && self.subscription_group.is_empty()
            && self.webhook.is_empty()
            && self.mailing_list.is_empty()
    }
}

impl Converge for Tracking {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        drift::scalar(
            &self.event.enabled,
            &observed.event.enabled,
            &format!("{path}.event.enabled"),
            out,
        );
        let Some(alert) = &self.alert else {
            return;
        };
        let fallback = TrackingAlert::default();
        let seen = observed.alert.as_ref().unwrap_or(&fallback);
        let path = format!("{path}.alert");
        drift::scalar(&alert.enabled, &seen.enabled, &format!("{path}.enabled"), out);
        drift::scalar(&alert.frequency, &seen.frequency, &format!("{path}.frequency"), out);
        alert.subscription_group.drift(
            &seen.subscription_group,
            &format!("{path}.subscription_group"),
            out,
        );
        alert
            .webhook
            .drift(&seen.webhook, &format!("{path}.webhook"), out);
        alert
            .mailing_list
            .drift(&seen.mailing_list, &format!("{path}.mailing_list"), out);
    }

    /// A left-out alert goes out as the remote defaults; left-out alert
    /// targets go out empty.
    fn resets(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        let Some(seen) = &observed.alert else {
            return;
        };
        let path = format!("{path}.alert");
        match &self.alert {
            Some(alert) => {
                alert.subscription_group.resets(
                    &seen.subscription_group,
                    &format!("{path}.subscription_group"),
                    out,
                );
                alert
                    .webhook
                    .resets(&seen.webhook, &format!("{path}.webhook"), out);
                alert
                    .mailing_list
                    .resets(&seen.mailing_list, &format!("{path}.mailing_list"), out);
            }
            None if !seen.is_default() => {
                out.push(FieldDrift::new(&path, &TrackingAlert::default(), seen));
            }
            None => {}
        }
    }
}
