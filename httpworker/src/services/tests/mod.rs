//! Service-level tests for the HTTP worker

mod commander;
