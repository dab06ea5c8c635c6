//! Dialogue driver and booking resolver
//!
//! Two interchangeable dialogue strategies sit in front of one resolver:
//!
//! - [`ScriptedDialogue`] — a step-indexed form-filling state machine driven
//!   by regex extraction; never calls an external model.
//! - [`DelegatedDialogue`] — hands extraction to an external text-generation
//!   service and watches its replies for a completion sentinel.
//!
//! Both end in [`resolver::resolve_booking`], which turns the collected
//! fields into a reservation against the inventory store. Every failure the
//! user can cause is a normal outcome here, never an error: unmatched input
//! re-prompts, a dead model call becomes an apology, and "no routes" / "no
//! seats" are rendered verbatim.

pub mod delegate;
pub mod dialogue;
pub mod resolver;

pub use delegate::{DelegatedDialogue, TurnResult};
pub use dialogue::{BookingStep, DialogueState, ScriptedDialogue, TripDetails, TurnReply};
pub use resolver::{resolve_booking, BookingConfirmation, BookingOutcome};
