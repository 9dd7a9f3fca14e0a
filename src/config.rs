use std::env;

const DEFAULT_DOCUMENT_TOPICS: &str =
    "company documents, finances, companies, company plans, personnel changes, revenue, document content, or data";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub llm_provider: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub oracle_timeout_secs: u64,
    pub documents_dir: String,
    pub document_topics: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "appointments.db".to_string()),
            llm_provider: env::var("LLM_PROVIDER")
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|_| "openai".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            oracle_timeout_secs: env::var("ORACLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            documents_dir: env::var("DOCUMENTS_DIR").unwrap_or_else(|_| "documents".to_string()),
            document_topics: env::var("DOCUMENT_TOPICS")
                .unwrap_or_else(|_| DEFAULT_DOCUMENT_TOPICS.to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: ":memory:".to_string(),
            llm_provider: "openai".to_string(),
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            oracle_timeout_secs: 30,
            documents_dir: "documents".to_string(),
            document_topics: DEFAULT_DOCUMENT_TOPICS.to_string(),
        }
    }
}
