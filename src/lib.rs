//! Operator toolkit for running a programming-course tournament.
//!
//! Discovery, builds, matches and notifications are thin concurrent
//! clients of external HTTP services; each step reads and writes plain
//! files in the working directory so a crashed run can be rerun safely.

pub mod build;
pub mod config;
pub mod dispatch;
pub mod export;
pub mod github;
pub mod matches;
pub mod notify;
pub mod pairing;
pub mod results;
pub mod services;
pub mod types;

#[cfg(test)]
pub mod test_utils;
