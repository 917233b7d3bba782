//! HTML parsers for Sportsbet race and schedule pages.

pub mod odds;
pub mod race_card;
pub mod schedule;

pub use race_card::RaceCardParser;
pub use schedule::{RaceStatus, ScheduleParser};
