//! Declarative rule model.

pub mod active_period;
pub mod criteria;
pub mod exception;
pub mod position;
pub mod range;
pub mod reference;
pub mod rule;
pub mod schedule;
pub mod service;
pub mod tracking;
pub mod tristate;

pub use active_period::ActivePeriod;
pub use criteria::{ApplicationCriteria, DeviceAttributes, EndpointCriteria, InternetDestination};
pub use exception::{ExceptionModel, ExceptionSet, InternetException, WanException};
pub use position::{Position, PositionAnchor};
pub use range::RangeValue;
pub use reference::{RefMode, Reference};
pub use rule::{ConnectionOrigin, Direction, InternetRule, OperatingSystem, RuleAction, WanRule};
pub use schedule::{ActiveOn, RecurringWindow, Schedule, Weekday};
pub use service::{CustomService, Protocol, ServiceSpec};
pub use tracking::{AlertFrequency, Tracking, TrackingAlert, TrackingEvent};
pub use tristate::{FieldPolicy, PayloadMode, TriState};
