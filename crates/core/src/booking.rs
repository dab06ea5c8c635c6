//! Booking domain types
//!
//! Routes are a fixed reference set created at startup and never mutated.
//! Reservations are append-only; nothing in this system updates or deletes
//! one once it has been created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fixed origin/destination bus service offering with schedule and price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Unique route identifier
    pub id: String,
    /// Departure city
    pub origin: String,
    /// Arrival city
    pub destination: String,
    /// Departure time, "HH:MM"
    pub departure_time: String,
    /// Arrival time, "HH:MM"
    pub arrival_time: String,
    /// Ticket price in dollars
    pub price: f64,
}

/// A booked seat on a route for a specific passenger and travel date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier, generated at creation
    pub id: String,
    /// Passenger name
    pub name: String,
    /// Passenger phone number
    pub phone: String,
    /// Foreign reference to [`Route::id`]
    pub route_id: String,
    /// Travel date as the user stated it. Compared by exact string
    /// equality, never parsed as a calendar date.
    pub travel_date: String,
    /// Seat number within the cabin, 1-based
    pub seat_number: u8,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Booking fields extracted from a conversation
///
/// Transient: produced by the dialogue driver per turn, consumed once by
/// the booking resolver and then discarded. Every field is optional because
/// extraction runs against an untrusted external boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub destination: Option<String>,
    pub travel_date: Option<String>,
    pub seat_preference: Option<String>,
}

impl BookingInfo {
    /// True when no field was extracted at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.destination.is_none()
            && self.travel_date.is_none()
            && self.seat_preference.is_none()
    }
}

/// Seat layout policy
///
/// Seats are numbered left-to-right, row by row, starting at 1, in a
/// 4-across cabin: residues 0 and 1 (mod 4) sit at the windows, 2 and 3 on
/// the aisle. This is a policy decision rather than a physical constraint,
/// so it lives in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatLayout {
    /// Total seats per bus
    #[serde(default = "default_seat_count")]
    pub seat_count: u8,
    /// Seat-number residues (mod 4) counted as window seats
    #[serde(default = "default_window_residues")]
    pub window_residues: Vec<u8>,
    /// Seat-number residues (mod 4) counted as aisle seats
    #[serde(default = "default_aisle_residues")]
    pub aisle_residues: Vec<u8>,
}

fn default_seat_count() -> u8 {
    40
}
fn default_window_residues() -> Vec<u8> {
    vec![0, 1]
}
fn default_aisle_residues() -> Vec<u8> {
    vec![2, 3]
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self {
            seat_count: default_seat_count(),
            window_residues: default_window_residues(),
            aisle_residues: default_aisle_residues(),
        }
    }
}

impl SeatLayout {
    /// Is the given seat number a window seat under this layout?
    pub fn is_window(&self, seat: u8) -> bool {
        self.window_residues.contains(&(seat % 4))
    }

    /// Is the given seat number an aisle seat under this layout?
    pub fn is_aisle(&self, seat: u8) -> bool {
        self.aisle_residues.contains(&(seat % 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_classes() {
        let layout = SeatLayout::default();
        assert_eq!(layout.seat_count, 40);
        // Seat 1 and 4 are windows, 2 and 3 are aisle
        assert!(layout.is_window(1));
        assert!(layout.is_window(4));
        assert!(layout.is_aisle(2));
        assert!(layout.is_aisle(3));
        assert!(!layout.is_window(2));
        assert!(!layout.is_aisle(40));
    }

    #[test]
    fn test_booking_info_empty() {
        assert!(BookingInfo::default().is_empty());

        let info = BookingInfo {
            destination: Some("Boston".to_string()),
            ..Default::default()
        };
        assert!(!info.is_empty());
    }

    #[test]
    fn test_reservation_serde_round_trip() {
        let reservation = Reservation {
            id: "abc".to_string(),
            name: "Jane Doe".to_string(),
            phone: "5551234567".to_string(),
            route_id: "route1".to_string(),
            travel_date: "2024-05-01".to_string(),
            seat_number: 12,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&reservation).unwrap();
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reservation);
    }
}
