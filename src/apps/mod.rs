//! Models behind the individual app screens.
//!
//! Each app keeps only the state its screen needs. Anything that touches
//! the shared phone state goes through `PhoneController`.

pub mod calculator;
pub mod calendar;
pub mod camera;
pub mod contacts;
pub mod dialer;
pub mod game;
pub mod messages;
pub mod recorder;

pub use calculator::{Calculator, Operator};
pub use calendar::Agenda;
pub use camera::CameraSession;
pub use contacts::ContactBook;
pub use dialer::Dialer;
pub use game::{HighScoreStore, TapGame};
pub use messages::Inbox;
pub use recorder::Recorder;
