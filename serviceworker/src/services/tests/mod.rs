//! Service-level tests for the service worker

mod spawner;
