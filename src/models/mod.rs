pub mod appointment;
pub mod conversation;
pub mod intent;

pub use appointment::{Appointment, ContactField, ContactForm};
pub use conversation::{ChatTurn, ConversationState, Role, Session, Stage};
pub use intent::Intent;
