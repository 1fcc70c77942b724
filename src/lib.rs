//! # dailydo
//!
//! A personal daily task and habit tracker. Tasks belong to a calendar day,
//! can be checked off, and carry optional notes, an image reference and a
//! checklist. Everything is stored locally as JSON.
//!
//! The library is organised around [`board::DayBoard`], which owns the task
//! collection and the selected day and writes the whole collection back
//! through a [`storage::TaskStore`] after every change.

pub mod analytics;
pub mod board;
pub mod commands;
pub mod config;
pub mod day;
pub mod logging;
pub mod models;
pub mod recommended;
pub mod settings;
pub mod storage;
pub mod transfer;
pub mod tui;
