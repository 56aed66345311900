//! DevBoard Library
//!
//! This module exports the core components for testing and integration.

pub mod auth;
pub mod board;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod retention;
pub mod revalidate;
pub mod service;
pub mod types;
pub mod validation;
pub mod web;
