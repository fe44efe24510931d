//! Core use-case services.
//!
//! # Responsibility
//! - Resolve list filters into one store query.
//! - Orchestrate task mutations and batch updates over the stores.
//! - Keep callers decoupled from SQL and transaction handling.

pub mod batch;
pub mod task_filter;
pub mod task_service;
