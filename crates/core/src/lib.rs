//! Core types for the BusGo booking assistant
//!
//! This crate provides the foundational types shared across all other crates:
//! - Booking domain types (routes, reservations, extracted booking info)
//! - Seat layout policy
//! - Conversation types (turns, roles)
//! - Error types

pub mod booking;
pub mod conversation;
pub mod error;

pub use booking::{BookingInfo, Reservation, Route, SeatLayout};
pub use conversation::{Turn, TurnRole};
pub use error::{Error, Result};
