pub mod format;
pub mod indicators;
pub mod news_service;
pub mod quote_service;
