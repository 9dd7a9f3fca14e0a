pub mod ai;
pub mod booking;
pub mod conversation;
pub mod dates;
pub mod documents;
