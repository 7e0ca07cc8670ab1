//! UI Module - egui integration and PhoneController
//!
//! Handles the interface between the phone core and the egui frontend.
//! `controller` owns all shared phone state; `router` maps it to a screen;
//! `screens` and `widgets` draw it.

pub mod app;
pub mod controller;
pub mod router;
pub mod screens;
pub mod threading;
pub mod widgets;

pub use app::{PhoneApp, UIState};
pub use controller::{PhoneController, PhoneSnapshot, Providers};
pub use router::ScreenId;
