//! Application layer
//!
//! Use cases that turn posted invoice forms into domain drafts and drive the
//! domain service for previews and submissions.

pub mod invoice;
