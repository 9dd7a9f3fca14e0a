use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DocumentQuery,
    AppointmentBooking,
    GeneralChat,
}

impl Intent {
    /// Keyword match order used when coercing a free-text oracle reply.
    pub const PRIORITY: [Intent; 3] = [
        Intent::DocumentQuery,
        Intent::AppointmentBooking,
        Intent::GeneralChat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DocumentQuery => "document_query",
            Intent::AppointmentBooking => "appointment_booking",
            Intent::GeneralChat => "general_chat",
        }
    }

    /// Lowercases and trims `reply`, then returns the first intent whose
    /// keyword occurs in it. Anything unrecognised is `GeneralChat`.
    pub fn from_oracle_reply(reply: &str) -> Self {
        let normalized = reply.trim().to_lowercase();
        Self::PRIORITY
            .into_iter()
            .find(|intent| normalized.contains(intent.as_str()))
            .unwrap_or(Intent::GeneralChat)
    }
}
