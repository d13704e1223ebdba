//! Speech reminder: announces upcoming calendar events by synthesized speech.
//!
//! The [`scheduler::AlertScheduler`] polls a [`calendar::CalendarSource`]
//! once per minute and hands due alerts to a [`speech::Notifier`].

pub mod calendar;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod scheduler;
pub mod shutdown;
pub mod speech;
