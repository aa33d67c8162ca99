use std::sync::Arc;

use crate::chatbot::Chatbot;
use crate::config::AppConfig;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn Storage>,
    pub chatbot: Arc<Chatbot>,
}
