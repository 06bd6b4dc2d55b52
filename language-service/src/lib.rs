//! Language Service - HTTP endpoints over Google Cloud Natural Language.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod shaping;
pub mod startup;
