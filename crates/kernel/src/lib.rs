//! Back-office listing kernel.
//!
//! This library exposes the listing engine, document stores and HTTP
//! surface for integration testing. The server entry point is the
//! `backoffice` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod listing;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
