//! Scripted dialogue driver
//!
//! A step-indexed form-filling state machine for the typed-chat flow. Each
//! step owns the regex heuristics for one field: a hit records the field and
//! advances the cursor, a miss re-prompts in place. The state is a plain
//! value passed in and returned per turn, independent of any presentation
//! layer. This driver never calls an external model.

use std::sync::Arc;

use chrono::{Datelike, Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use busgo_core::{BookingInfo, SeatLayout};
use busgo_store::InventoryStore;

use crate::resolver::{resolve_booking, BookingOutcome};

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(?:my|the|this|is)\s+name\s+is\s+)?([A-Za-z]+(?:\s+[A-Za-z]+)?)").unwrap()
});
static FROM_TO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)from\s+([a-zA-Z\s]+?)\s+to\s+([a-zA-Z\s]+)").unwrap());
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/-](\d{1,2})(?:[/-](\d{2,4}))?").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{3}[-.\s]?\d{3}[-.\s]?\d{4}|\(\d{3}\)\s*\d{3}[-.\s]?\d{4}|\d{10}").unwrap()
});
static OPTION_1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)option\s*1|first\s*option|8:00|8\s*am").unwrap());
static OPTION_2_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)option\s*2|second\s*option|11:30").unwrap());
static OPTION_3_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)option\s*3|third\s*option|3:00|3\s*pm").unwrap());

/// The three fixed departure options offered before confirmation:
/// (departure, arrival, price)
const DEPARTURE_OPTIONS: [(&str, &str, u8); 3] = [
    ("8:00 AM", "10:30 AM", 45),
    ("11:30 AM", "2:00 PM", 38),
    ("3:00 PM", "5:30 PM", 42),
];

/// Cursor over the required booking fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    #[default]
    Name,
    Destination,
    Date,
    Seat,
    Phone,
    Confirmation,
}

impl BookingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Name => "name",
            BookingStep::Destination => "destination",
            BookingStep::Date => "date",
            BookingStep::Seat => "seat",
            BookingStep::Phone => "phone",
            BookingStep::Confirmation => "confirmation",
        }
    }
}

impl std::fmt::Display for BookingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields collected so far in one booking cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDetails {
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub seat_preference: String,
    pub phone: String,
}

impl From<&TripDetails> for BookingInfo {
    fn from(details: &TripDetails) -> Self {
        let opt = |s: &String| {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        };
        BookingInfo {
            name: opt(&details.name),
            phone: opt(&details.phone),
            destination: opt(&details.destination),
            travel_date: opt(&details.date),
            seat_preference: opt(&details.seat_preference),
        }
    }
}

/// Dialogue state: the step cursor plus everything gathered so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueState {
    pub step: BookingStep,
    pub details: TripDetails,
}

/// Result of processing one utterance
#[derive(Debug, Clone)]
pub struct TurnReply {
    /// State to carry into the next turn
    pub state: DialogueState,
    /// Assistant response text
    pub response: String,
    /// Set when this turn completed a booking cycle
    pub booking: Option<BookingOutcome>,
}

/// Step-indexed dialogue driver for the typed-chat flow
pub struct ScriptedDialogue {
    store: Arc<InventoryStore>,
    layout: SeatLayout,
}

impl ScriptedDialogue {
    pub fn new(store: Arc<InventoryStore>, layout: SeatLayout) -> Self {
        Self { store, layout }
    }

    /// Opening message for a fresh session
    pub fn greeting(&self) -> &'static str {
        "Hi there! I'm your BusGo assistant. To get started with your booking, \
         may I know your name?"
    }

    /// Process one utterance, returning the next state and the reply
    pub fn advance(&self, state: DialogueState, utterance: &str) -> TurnReply {
        match state.step {
            BookingStep::Name => self.take_name(state, utterance),
            BookingStep::Destination => self.take_destination(state, utterance),
            BookingStep::Date => self.take_date(state, utterance),
            BookingStep::Seat => self.take_seat(state, utterance),
            BookingStep::Phone => self.take_phone(state, utterance),
            BookingStep::Confirmation => self.take_confirmation(state, utterance),
        }
    }

    fn take_name(&self, mut state: DialogueState, utterance: &str) -> TurnReply {
        match NAME_RE.captures(utterance).and_then(|c| c.get(1)) {
            Some(m) => {
                let name = m.as_str().trim().to_string();
                let response = format!(
                    "Nice to meet you, {name}! Where would you like to travel from and to?"
                );
                state.details.name = name;
                state.step = BookingStep::Destination;
                TurnReply {
                    state,
                    response,
                    booking: None,
                }
            }
            None => TurnReply {
                state,
                response: "I didn't quite catch your name. Could you please tell me your name?"
                    .to_string(),
                booking: None,
            },
        }
    }

    fn take_destination(&self, mut state: DialogueState, utterance: &str) -> TurnReply {
        let captured = FROM_TO_RE.captures(utterance).map(|c| {
            (
                c[1].trim().to_string(),
                c[2].trim().to_string(),
            )
        });

        match captured {
            Some((from, to)) if !from.is_empty() && !to.is_empty() => {
                let response = format!(
                    "Great! I've got you traveling from {from} to {to}. \
                     When would you like to travel?"
                );
                state.details.origin = from;
                state.details.destination = to;
                state.step = BookingStep::Date;
                TurnReply {
                    state,
                    response,
                    booking: None,
                }
            }
            _ => TurnReply {
                state,
                response: "Could you please tell me your departure city and destination? \
                           For example: 'I want to travel from New York to Boston'"
                    .to_string(),
                booking: None,
            },
        }
    }

    fn take_date(&self, mut state: DialogueState, utterance: &str) -> TurnReply {
        let lower = utterance.to_lowercase();
        let today = Local::now().date_naive();

        let parsed = if lower.contains("tomorrow") {
            today.checked_add_days(Days::new(1))
        } else if lower.contains("today") {
            Some(today)
        } else {
            DATE_RE.captures(utterance).and_then(|c| {
                let month: u32 = c.get(1)?.as_str().parse().ok()?;
                let day: u32 = c.get(2)?.as_str().parse().ok()?;
                let year: i32 = match c.get(3) {
                    Some(y) => {
                        let y: i32 = y.as_str().parse().ok()?;
                        if y < 100 {
                            2000 + y
                        } else {
                            y
                        }
                    }
                    None => today.year(),
                };
                NaiveDate::from_ymd_opt(year, month, day)
            })
        };

        match parsed {
            Some(date) => {
                let date_str = date.format("%A, %B %-d").to_string();
                let response = format!(
                    "Got it! You're traveling on {date_str}. Do you have any seat \
                     preferences? (Window, Aisle, or No preference)"
                );
                state.details.date = date_str;
                state.step = BookingStep::Seat;
                TurnReply {
                    state,
                    response,
                    booking: None,
                }
            }
            None => TurnReply {
                state,
                response: "I need to know when you'd like to travel. You can say \
                           something like 'tomorrow', 'today', or a date like 05/01."
                    .to_string(),
                booking: None,
            },
        }
    }

    fn take_seat(&self, mut state: DialogueState, utterance: &str) -> TurnReply {
        let lower = utterance.to_lowercase();

        let preference = if lower.contains("window") {
            Some("Window")
        } else if lower.contains("aisle") {
            Some("Aisle")
        } else if lower.contains("no preference")
            || lower.contains("any")
            || lower.contains("doesn't matter")
        {
            Some("No Preference")
        } else {
            None
        };

        match preference {
            Some(preference) => {
                state.details.seat_preference = preference.to_string();
                state.step = BookingStep::Phone;
                let noted = match preference {
                    "Window" => "your preference for a window seat".to_string(),
                    "Aisle" => "your preference for an aisle seat".to_string(),
                    _ => "that you don't have a specific seat preference".to_string(),
                };
                TurnReply {
                    state,
                    response: format!(
                        "Perfect! I've noted {noted}. Could you please provide your \
                         phone number for booking confirmation?"
                    ),
                    booking: None,
                }
            }
            None => TurnReply {
                state,
                response: "Do you prefer a window seat, an aisle seat, or do you have \
                           no preference?"
                    .to_string(),
                booking: None,
            },
        }
    }

    fn take_phone(&self, mut state: DialogueState, utterance: &str) -> TurnReply {
        match PHONE_RE.find(utterance) {
            Some(m) => {
                let phone: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
                state.details.phone = phone;
                state.step = BookingStep::Confirmation;

                let details = &state.details;
                let options = DEPARTURE_OPTIONS
                    .iter()
                    .enumerate()
                    .map(|(i, (dep, arr, price))| {
                        format!("{}. Departure: {dep} - Arrival: {arr} - ${price}", i + 1)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let response = format!(
                    "Thank you, {}! I've found several options for {} to {} on {} \
                     with a {} seat:\n\n{options}\n\nWhich option would you prefer?",
                    details.name,
                    details.origin,
                    details.destination,
                    details.date,
                    details.seat_preference.to_lowercase(),
                );
                TurnReply {
                    state,
                    response,
                    booking: None,
                }
            }
            None => TurnReply {
                state,
                response: "I need your phone number to complete the booking. Please \
                           provide a valid 10-digit phone number."
                    .to_string(),
                booking: None,
            },
        }
    }

    /// The confirmation step extracts no field: any of the three fixed
    /// options completes the cycle and resets the machine for a new booking.
    fn take_confirmation(&self, state: DialogueState, utterance: &str) -> TurnReply {
        let selected = if OPTION_1_RE.is_match(utterance) {
            Some(0)
        } else if OPTION_2_RE.is_match(utterance) {
            Some(1)
        } else if OPTION_3_RE.is_match(utterance) {
            Some(2)
        } else {
            None
        };

        match selected {
            Some(index) => {
                let info = BookingInfo::from(&state.details);
                let outcome = resolve_booking(&self.store, &self.layout, &info);
                tracing::info!(
                    step = %state.step,
                    option = index + 1,
                    confirmed = outcome.is_confirmed(),
                    "Scripted booking cycle completed"
                );

                let (departure, _, _) = DEPARTURE_OPTIONS[index];
                let response = format!(
                    "Perfect! You've selected the {departure} departure.\n\n{outcome}\n\n\
                     Thank you for booking with BusGo! Is there anything else I can \
                     help you with?"
                );

                TurnReply {
                    state: DialogueState::default(),
                    response,
                    booking: Some(outcome),
                }
            }
            None => TurnReply {
                state,
                response: "Please select one of the available options (1, 2, or 3), or \
                           let me know if you'd like to see more options."
                    .to_string(),
                booking: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue() -> ScriptedDialogue {
        ScriptedDialogue::new(Arc::new(InventoryStore::in_memory()), SeatLayout::default())
    }

    #[test]
    fn test_happy_path_books_a_seat() {
        let dialogue = dialogue();
        let state = DialogueState::default();

        let reply = dialogue.advance(state, "My name is Jane Doe");
        assert_eq!(reply.state.step, BookingStep::Destination);
        assert_eq!(reply.state.details.name, "Jane Doe");
        assert!(reply.response.contains("Jane Doe"));

        let reply = dialogue.advance(reply.state, "I want to travel from New York to Boston");
        assert_eq!(reply.state.step, BookingStep::Date);
        assert_eq!(reply.state.details.origin, "New York");
        assert_eq!(reply.state.details.destination, "Boston");

        let reply = dialogue.advance(reply.state, "tomorrow");
        assert_eq!(reply.state.step, BookingStep::Seat);
        assert!(!reply.state.details.date.is_empty());

        let reply = dialogue.advance(reply.state, "window please");
        assert_eq!(reply.state.step, BookingStep::Phone);
        assert_eq!(reply.state.details.seat_preference, "Window");

        let reply = dialogue.advance(reply.state, "555-123-4567");
        assert_eq!(reply.state.step, BookingStep::Confirmation);
        assert_eq!(reply.state.details.phone, "5551234567");
        assert!(reply.response.contains("option"));

        let reply = dialogue.advance(reply.state, "option 1");
        // Cycle restarts for a new booking
        assert_eq!(reply.state, DialogueState::default());
        let outcome = reply.booking.expect("booking should have run");
        assert!(outcome.is_confirmed());
        assert!(reply.response.contains("Booking Confirmed!"));
    }

    #[test]
    fn test_unmatched_input_reprompts_in_place() {
        let dialogue = dialogue();

        // Destination step without "from X to Y"
        let state = DialogueState {
            step: BookingStep::Destination,
            ..Default::default()
        };
        let reply = dialogue.advance(state.clone(), "just get me out of here 42");
        assert_eq!(reply.state.step, BookingStep::Destination);

        // Date step with an impossible date
        let state = DialogueState {
            step: BookingStep::Date,
            ..Default::default()
        };
        let reply = dialogue.advance(state, "13/45");
        assert_eq!(reply.state.step, BookingStep::Date);

        // Phone step with too few digits
        let state = DialogueState {
            step: BookingStep::Phone,
            ..Default::default()
        };
        let reply = dialogue.advance(state, "12345");
        assert_eq!(reply.state.step, BookingStep::Phone);
    }

    #[test]
    fn test_name_with_lead_in_phrase() {
        let dialogue = dialogue();
        let reply = dialogue.advance(DialogueState::default(), "my name is Alice");
        assert_eq!(reply.state.details.name, "Alice");
    }

    #[test]
    fn test_bare_name_is_accepted() {
        let dialogue = dialogue();
        let reply = dialogue.advance(DialogueState::default(), "Bob Smith");
        assert_eq!(reply.state.details.name, "Bob Smith");
    }

    #[test]
    fn test_numeric_date_with_year() {
        let dialogue = dialogue();
        let state = DialogueState {
            step: BookingStep::Date,
            ..Default::default()
        };
        let reply = dialogue.advance(state, "I'd like to go on 05/01/2024");
        assert_eq!(reply.state.step, BookingStep::Seat);
        assert!(reply.state.details.date.contains("May 1"));
    }

    #[test]
    fn test_seat_no_preference_variants() {
        let dialogue = dialogue();
        for phrase in ["no preference", "any seat is fine", "doesn't matter"] {
            let state = DialogueState {
                step: BookingStep::Seat,
                ..Default::default()
            };
            let reply = dialogue.advance(state, phrase);
            assert_eq!(reply.state.details.seat_preference, "No Preference");
            assert_eq!(reply.state.step, BookingStep::Phone);
        }
    }

    #[test]
    fn test_punctuated_phone_is_normalized() {
        let dialogue = dialogue();
        let state = DialogueState {
            step: BookingStep::Phone,
            details: TripDetails {
                name: "Jane".to_string(),
                origin: "New York".to_string(),
                destination: "Boston".to_string(),
                date: "Friday, May 3".to_string(),
                seat_preference: "Window".to_string(),
                phone: String::new(),
            },
        };
        let reply = dialogue.advance(state, "(555) 123.4567");
        assert_eq!(reply.state.details.phone, "5551234567");
    }

    #[test]
    fn test_confirmation_by_time_cue() {
        let dialogue = dialogue();
        let state = DialogueState {
            step: BookingStep::Confirmation,
            details: TripDetails {
                name: "Jane".to_string(),
                origin: "New York".to_string(),
                destination: "Boston".to_string(),
                date: "Friday, May 3".to_string(),
                seat_preference: "Aisle".to_string(),
                phone: "5551234567".to_string(),
            },
        };
        let reply = dialogue.advance(state, "the 11:30 one works");
        assert!(reply.booking.is_some());
        assert!(reply.response.contains("11:30 AM"));
    }

    #[test]
    fn test_confirmation_reprompts_on_unknown_option() {
        let dialogue = dialogue();
        let state = DialogueState {
            step: BookingStep::Confirmation,
            ..Default::default()
        };
        let reply = dialogue.advance(state, "maybe later");
        assert_eq!(reply.state.step, BookingStep::Confirmation);
        assert!(reply.booking.is_none());
    }

    #[test]
    fn test_booking_lands_in_store() {
        let store = Arc::new(InventoryStore::in_memory());
        let dialogue = ScriptedDialogue::new(store.clone(), SeatLayout::default());

        let state = DialogueState {
            step: BookingStep::Confirmation,
            details: TripDetails {
                name: "Jane".to_string(),
                origin: "New York".to_string(),
                destination: "Boston".to_string(),
                date: "Friday, May 3".to_string(),
                seat_preference: "Window".to_string(),
                phone: "5551234567".to_string(),
            },
        };
        dialogue.advance(state, "option 2");
        assert_eq!(store.reservation_count(), 1);
    }
}
