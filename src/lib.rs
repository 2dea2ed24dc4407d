//! Personal income/expense tracking: a record store with change notification,
//! a pure filter/sort/aggregate query engine, per-screen view pipelines and a
//! validating lifecycle coordinator for create, edit and two-step delete.

pub mod actors;
pub mod engine;
pub mod models;
pub mod storage;
pub mod types;
