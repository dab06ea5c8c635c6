//! In-memory inventory with optional flat-JSON persistence
//!
//! The store owns the reservation list exclusively; callers never mutate it
//! directly. Persistence is deliberately naive: both documents are rewritten
//! in full, with no versioning and no protection against concurrent writers.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use busgo_core::{Reservation, Route};

use crate::StoreError;

/// File holding the route reference set
pub const ROUTES_FILE: &str = "bus_routes.json";
/// File holding the reservation list
pub const RESERVATIONS_FILE: &str = "reservations.json";

/// Inventory of routes and reservations
///
/// Constructed explicitly and shared by reference; there is no global
/// instance. The interior lock exists only because the HTTP server shares
/// one store across sessions — each individual booking flow is sequential.
pub struct InventoryStore {
    routes: Vec<Route>,
    reservations: RwLock<Vec<Reservation>>,
    data_dir: Option<PathBuf>,
    seat_count: u8,
}

impl InventoryStore {
    /// Create an in-memory store with the default route set and persistence
    /// disabled. Used by tests and as the fallback when no data directory
    /// is configured.
    pub fn in_memory() -> Self {
        Self {
            routes: default_routes(),
            reservations: RwLock::new(Vec::new()),
            data_dir: None,
            seat_count: 40,
        }
    }

    /// Open a persistent store rooted at `data_dir`.
    ///
    /// Missing or unreadable documents are seeded with defaults and written
    /// back, so a fresh deployment starts with the reference routes.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|source| StoreError::DataDir {
            path: data_dir.display().to_string(),
            source,
        })?;

        let routes = load_or_seed(&data_dir.join(ROUTES_FILE), default_routes);
        let reservations = load_or_seed(&data_dir.join(RESERVATIONS_FILE), Vec::new);

        tracing::info!(
            routes = routes.len(),
            reservations = reservations.len(),
            dir = %data_dir.display(),
            "Inventory loaded"
        );

        Ok(Self {
            routes,
            reservations: RwLock::new(reservations),
            data_dir: Some(data_dir),
            seat_count: 40,
        })
    }

    /// Override the seats-per-bus count (layout policy)
    pub fn with_seat_count(mut self, seat_count: u8) -> Self {
        self.seat_count = seat_count;
        self
    }

    /// All routes, in insertion order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look up a route by its identifier
    pub fn route_by_id(&self, route_id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == route_id)
    }

    /// Number of reservations currently held
    pub fn reservation_count(&self) -> usize {
        self.reservations.read().len()
    }

    /// Routes whose destination contains `destination`, case-insensitively,
    /// in insertion order. No ranking is applied; an unmatched destination
    /// yields an empty vec, never an error.
    pub fn find_routes_by_destination(&self, destination: &str) -> Vec<Route> {
        let needle = destination.to_lowercase();
        self.routes
            .iter()
            .filter(|route| route.destination.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Seats still open on `route_id` for `travel_date`, ascending.
    ///
    /// An unknown route yields an empty vec — a soft not-found signal, not
    /// an error. Dates are compared by exact string equality.
    pub fn available_seats(&self, route_id: &str, travel_date: &str) -> Vec<u8> {
        if self.route_by_id(route_id).is_none() {
            return Vec::new();
        }

        let reservations = self.reservations.read();
        let booked: Vec<u8> = reservations
            .iter()
            .filter(|r| r.route_id == route_id && r.travel_date == travel_date)
            .map(|r| r.seat_number)
            .collect();

        (1..=self.seat_count)
            .filter(|seat| !booked.contains(seat))
            .collect()
    }

    /// Append a new reservation and persist the updated list.
    ///
    /// Seat availability is NOT re-checked here; callers must consult
    /// [`available_seats`](Self::available_seats) first. A persistence
    /// failure is logged and the reservation is kept in memory.
    pub fn create_reservation(
        &self,
        name: &str,
        phone: &str,
        route_id: &str,
        travel_date: &str,
        seat_number: u8,
    ) -> Reservation {
        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            route_id: route_id.to_string(),
            travel_date: travel_date.to_string(),
            seat_number,
            created_at: Utc::now(),
        };

        let mut reservations = self.reservations.write();
        reservations.push(reservation.clone());

        if let Some(dir) = &self.data_dir {
            persist(&dir.join(RESERVATIONS_FILE), &*reservations);
        }

        tracing::info!(
            reservation_id = %reservation.id,
            route_id,
            travel_date,
            seat_number,
            "Reservation created"
        );

        reservation
    }
}

/// The reference route set used when no routes document exists
fn default_routes() -> Vec<Route> {
    vec![
        Route {
            id: "route1".to_string(),
            origin: "New York".to_string(),
            destination: "Boston".to_string(),
            departure_time: "08:00".to_string(),
            arrival_time: "12:00".to_string(),
            price: 45.00,
        },
        Route {
            id: "route2".to_string(),
            origin: "Boston".to_string(),
            destination: "Washington DC".to_string(),
            departure_time: "10:00".to_string(),
            arrival_time: "15:30".to_string(),
            price: 55.00,
        },
        Route {
            id: "route3".to_string(),
            origin: "New York".to_string(),
            destination: "Washington DC".to_string(),
            departure_time: "09:00".to_string(),
            arrival_time: "13:30".to_string(),
            price: 50.00,
        },
    ]
}

/// Load a JSON document, falling back to (and writing) seeded defaults when
/// it is absent or unreadable
fn load_or_seed<T, F>(path: &Path, seed: F) -> T
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to parse data file, reseeding");
                let value = seed();
                persist(path, &value);
                value
            }
        },
        Err(_) => {
            let value = seed();
            persist(path, &value);
            value
        }
    }
}

/// Rewrite a JSON document in full. Failures are logged, never surfaced.
fn persist<T: Serialize>(path: &Path, value: &T) {
    let serialized = match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to serialize data file");
            return;
        }
    };
    if let Err(e) = fs::write(path, serialized) {
        tracing::error!(path = %path.display(), error = %e, "Failed to write data file");
    }
}
