use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    AwaitingDate,
    AwaitingContact,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::AwaitingDate => "awaiting_date",
            Stage::AwaitingContact => "awaiting_contact",
        }
    }
}

/// Booking progress for one session.
///
/// Fields are only changed through the transition methods, so
/// `AwaitingContact` always carries the date that moved it there.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ConversationState {
    stage: Stage,
    pending_date: Option<NaiveDate>,
    last_input: Option<String>,
}

impl ConversationState {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn pending_date(&self) -> Option<NaiveDate> {
        self.pending_date
    }

    pub fn last_input(&self) -> Option<&str> {
        self.last_input.as_deref()
    }

    pub fn record_input(&mut self, input: &str) {
        self.last_input = Some(input.to_string());
    }

    /// idle -> awaiting_date
    pub fn begin_booking(&mut self) {
        self.stage = Stage::AwaitingDate;
        self.pending_date = None;
    }

    /// awaiting_date -> awaiting_contact. The date must come from a
    /// successful date resolution.
    pub fn confirm_date(&mut self, date: NaiveDate) {
        self.stage = Stage::AwaitingContact;
        self.pending_date = Some(date);
    }

    /// Back to idle after a booking is stored. Keeps `last_input`.
    pub fn complete(&mut self) {
        self.stage = Stage::Idle;
        self.pending_date = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub transcript: Vec<ChatTurn>,
    pub state: ConversationState,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transcript: Vec::new(),
            state: ConversationState::default(),
        }
    }

    pub fn push_user(&mut self, text: &str) {
        self.transcript.push(ChatTurn::user(text));
    }

    pub fn push_bot(&mut self, text: &str) {
        self.transcript.push(ChatTurn::bot(text));
    }

    pub fn reset(&mut self) {
        self.transcript.clear();
        self.state.reset();
    }
}
