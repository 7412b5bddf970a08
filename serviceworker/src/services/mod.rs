//! Concrete service implementations for the service worker

pub mod spawner;

#[cfg(test)]
mod tests;

pub use spawner::RealServiceSpawner;
