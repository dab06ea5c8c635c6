//! Booking resolution
//!
//! Turns a completed extraction into a confirmed reservation. Deterministic
//! and branch-free beyond what the algorithm states: first matching route
//! wins (no price/time ranking), lowest qualifying seat wins.

use busgo_core::{BookingInfo, SeatLayout};
use busgo_store::InventoryStore;

/// Placeholder for missing passenger details
const UNKNOWN: &str = "Unknown";

/// Outcome of a booking attempt
///
/// "No routes" and "no seats" are ordinary results surfaced to the user,
/// not faults.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    /// Reservation created
    Confirmed(BookingConfirmation),
    /// No route matched the requested destination
    NoRoutes { destination: String },
    /// The chosen route has no open seats on the requested date
    NoSeats,
}

/// Details rendered into the confirmation message
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub reservation_id: String,
    pub passenger: String,
    pub origin: String,
    pub destination: String,
    pub travel_date: String,
    pub departure_time: String,
    pub seat_number: u8,
    pub price: f64,
}

impl std::fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingOutcome::Confirmed(c) => write!(
                f,
                "Booking Confirmed!\n\
                 - Passenger: {}\n\
                 - From: {}\n\
                 - To: {}\n\
                 - Date: {}\n\
                 - Departure: {}\n\
                 - Seat: {}\n\
                 - Price: ${}\n\
                 - Reservation ID: {}",
                c.passenger,
                c.origin,
                c.destination,
                c.travel_date,
                c.departure_time,
                c.seat_number,
                c.price,
                c.reservation_id
            ),
            BookingOutcome::NoRoutes { destination } => {
                write!(f, "No routes found for {destination}")
            }
            BookingOutcome::NoSeats => write!(f, "No seats available."),
        }
    }
}

impl BookingOutcome {
    /// True when a reservation was created
    pub fn is_confirmed(&self) -> bool {
        matches!(self, BookingOutcome::Confirmed(_))
    }
}

/// Resolve a booking request against the inventory.
///
/// Algorithm, in order:
/// 1. look up routes by destination; none → `NoRoutes`
/// 2. take the first match (store insertion order)
/// 3. compute available seats for route + date; none → `NoSeats`
/// 4. apply the seat-preference policy
/// 5. create the reservation, defaulting missing name/phone to "Unknown"
pub fn resolve_booking(
    store: &InventoryStore,
    layout: &SeatLayout,
    info: &BookingInfo,
) -> BookingOutcome {
    let destination = info.destination.clone().unwrap_or_default();

    let routes = store.find_routes_by_destination(&destination);
    let Some(route) = routes.first() else {
        return BookingOutcome::NoRoutes { destination };
    };

    let travel_date = info.travel_date.clone().unwrap_or_default();
    let seats = store.available_seats(&route.id, &travel_date);
    if seats.is_empty() {
        return BookingOutcome::NoSeats;
    }

    let preference = info.seat_preference.clone().unwrap_or_default();
    let seat_number = pick_seat(&seats, &preference, layout);

    let name = info.name.as_deref().unwrap_or(UNKNOWN);
    let phone = info.phone.as_deref().unwrap_or(UNKNOWN);

    let reservation = store.create_reservation(name, phone, &route.id, &travel_date, seat_number);

    BookingOutcome::Confirmed(BookingConfirmation {
        reservation_id: reservation.id,
        passenger: reservation.name,
        origin: route.origin.clone(),
        destination: route.destination.clone(),
        travel_date,
        departure_time: route.departure_time.clone(),
        seat_number,
        price: route.price,
    })
}

/// Seat-preference policy: lowest qualifying seat, falling back to the
/// lowest available seat when no seat of the preferred class is open.
/// `seats` must be ascending and non-empty.
fn pick_seat(seats: &[u8], preference: &str, layout: &SeatLayout) -> u8 {
    let preference = preference.to_lowercase();
    if preference.contains("window") {
        seats
            .iter()
            .copied()
            .find(|s| layout.is_window(*s))
            .unwrap_or(seats[0])
    } else if preference.contains("aisle") {
        seats
            .iter()
            .copied()
            .find(|s| layout.is_aisle(*s))
            .unwrap_or(seats[0])
    } else {
        seats[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(destination: &str, date: &str, preference: &str) -> BookingInfo {
        BookingInfo {
            name: Some("Jane Doe".to_string()),
            phone: Some("5551234567".to_string()),
            destination: Some(destination.to_string()),
            travel_date: Some(date.to_string()),
            seat_preference: Some(preference.to_string()),
        }
    }

    #[test]
    fn test_window_preference_picks_first_window_seat() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();

        let outcome = resolve_booking(&store, &layout, &info("Boston", "2024-05-01", "window"));
        let BookingOutcome::Confirmed(c) = outcome else {
            panic!("expected confirmation");
        };
        // Seat 1 is the first window seat on an empty bus
        assert_eq!(c.seat_number, 1);
        assert_eq!(c.origin, "New York");
        assert_eq!(c.destination, "Boston");
        assert_eq!(store.reservation_count(), 1);
    }

    #[test]
    fn test_confirmation_text_mentions_route_details() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();

        let outcome = resolve_booking(&store, &layout, &info("Boston", "2024-05-01", "window"));
        let text = outcome.to_string();
        assert!(text.contains("New York"));
        assert!(text.contains("Boston"));
        assert!(text.contains("45"));
        assert!(text.contains("Reservation ID: "));
    }

    #[test]
    fn test_aisle_preference_picks_first_aisle_seat() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();

        let outcome = resolve_booking(&store, &layout, &info("Boston", "2024-05-01", "Aisle please"));
        let BookingOutcome::Confirmed(c) = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(c.seat_number, 2);
        assert!(layout.is_aisle(c.seat_number));
    }

    #[test]
    fn test_no_preference_picks_lowest_available() {
        let store = InventoryStore::in_memory();
        store.create_reservation("X", "Y", "route1", "2024-05-01", 1);
        let layout = SeatLayout::default();

        let outcome = resolve_booking(&store, &layout, &info("Boston", "2024-05-01", "whatever"));
        let BookingOutcome::Confirmed(c) = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(c.seat_number, 2);
    }

    #[test]
    fn test_window_falls_back_when_no_window_seats_left() {
        let store = InventoryStore::in_memory().with_seat_count(4);
        let layout = SeatLayout::default();
        // Book both window seats (1 and 4), leaving aisle seats 2 and 3
        store.create_reservation("X", "Y", "route1", "2024-05-01", 1);
        store.create_reservation("X", "Y", "route1", "2024-05-01", 4);

        let outcome = resolve_booking(&store, &layout, &info("Boston", "2024-05-01", "window"));
        let BookingOutcome::Confirmed(c) = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(c.seat_number, 2);
    }

    #[test]
    fn test_resolved_seat_was_available_beforehand() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();
        store.create_reservation("X", "Y", "route1", "2024-05-01", 1);

        let available = store.available_seats("route1", "2024-05-01");
        let outcome = resolve_booking(&store, &layout, &info("Boston", "2024-05-01", "aisle"));
        let BookingOutcome::Confirmed(c) = outcome else {
            panic!("expected confirmation");
        };
        assert!(available.contains(&c.seat_number));
    }

    #[test]
    fn test_unknown_destination_is_a_soft_outcome() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();

        let outcome = resolve_booking(
            &store,
            &layout,
            &info("Nowhereville", "2024-05-01", "window"),
        );
        assert_eq!(
            outcome,
            BookingOutcome::NoRoutes {
                destination: "Nowhereville".to_string()
            }
        );
        assert_eq!(outcome.to_string(), "No routes found for Nowhereville");
        assert_eq!(store.reservation_count(), 0);
    }

    #[test]
    fn test_full_bus_reports_no_seats() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();
        for seat in 1..=40 {
            store.create_reservation("X", "Y", "route1", "2024-05-01", seat);
        }

        let outcome = resolve_booking(&store, &layout, &info("Boston", "2024-05-01", "window"));
        assert_eq!(outcome, BookingOutcome::NoSeats);
        assert_eq!(outcome.to_string(), "No seats available.");
        assert_eq!(store.reservation_count(), 40);
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();

        let outcome = resolve_booking(
            &store,
            &layout,
            &BookingInfo {
                destination: Some("Boston".to_string()),
                ..Default::default()
            },
        );
        let BookingOutcome::Confirmed(c) = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(c.passenger, "Unknown");
        assert_eq!(c.travel_date, "");
        assert_eq!(c.seat_number, 1);
    }

    #[test]
    fn test_empty_extraction_books_first_route() {
        let store = InventoryStore::in_memory();
        let layout = SeatLayout::default();

        // An empty destination substring matches every route, so an
        // all-None extraction still books the first route under Unknown.
        let outcome = resolve_booking(&store, &layout, &BookingInfo::default());
        assert!(outcome.is_confirmed());
    }
}
