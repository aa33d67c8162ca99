pub mod api_router;
pub mod chat;
pub mod chatbot;
pub mod config;
pub mod shared;
pub mod storage;
pub mod tickets;
