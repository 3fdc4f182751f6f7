//! API request handlers

pub mod campaigns;
pub mod draw;
pub mod health;
pub mod incentives;
pub mod rewards;
pub mod samples;
pub mod submissions;
pub mod tickets;
