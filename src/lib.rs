pub mod config;
pub mod matcher;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod scraper;
pub mod service;
pub mod storage;
pub mod utils;
