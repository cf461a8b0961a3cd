//! Input mapping: raw pointer, scroll and key events become [`Action`]s.
//!
//! # Invariants
//! - Cameras and the driving loop consume actions, never raw window events.
//! - Pointer positions are stored with y pointing up (window height minus the
//!   platform's y), so drags read like plot coordinates.
//! - No windowing dependency: the app translates its own event types.

pub mod action;
pub mod pointer;

pub use action::{Action, Key};
pub use pointer::{ORBIT_SPEED, PointerButton, PointerState};
