pub mod decision_models;
pub mod decision_store;
