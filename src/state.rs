use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};

use crate::config::AppConfig;
use crate::db::AppointmentStore;
use crate::models::Session;
use crate::services::ai::LlmProvider;
use crate::services::dates::DateResolutionPipeline;
use crate::services::documents::DocumentQuery;

pub struct AppState {
    pub config: AppConfig,
    pub llm: Arc<dyn LlmProvider>,
    pub documents: Box<dyn DocumentQuery>,
    pub store: Box<dyn AppointmentStore>,
    pub dates: DateResolutionPipeline,
    pub sessions: SessionRegistry,
    /// Fixed "today" for date resolution; the local date when unset.
    pub reference_date: Option<NaiveDate>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        llm: Arc<dyn LlmProvider>,
        documents: Box<dyn DocumentQuery>,
        store: Box<dyn AppointmentStore>,
    ) -> Self {
        Self {
            config,
            dates: DateResolutionPipeline::standard(Arc::clone(&llm)),
            llm,
            documents,
            store,
            sessions: SessionRegistry::default(),
            reference_date: None,
        }
    }

    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.reference_date = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Live sessions by id. Each session has its own async lock, so turns within
/// a session run one at a time while separate sessions run in parallel.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(tokio::sync::Mutex::new(Session::new(id.clone())));
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), session);
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<tokio::sync::Mutex<Session>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Drops the session. Handlers still holding its lock finish their turn
    /// on the detached copy.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
