//! Service-level tests for the root supervisor

mod launcher;
