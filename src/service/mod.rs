pub mod chat_session;
pub mod openai_service;
pub mod schedule_store;
pub mod suggestion_parser;
