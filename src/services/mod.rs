pub mod fallback_data;
pub mod fixture_normalizer;
pub mod football_data;
pub mod kv_store;
pub mod prediction_service;
pub mod prediction_store;
