//! Invoice capture and submission service for Peruvian electronic invoicing.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
