//! EntryVentures Backend Library
//!
//! Loan-management API: clients, loans, loan collections and the users who
//! manage them, served over axum with PostgreSQL persistence.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
