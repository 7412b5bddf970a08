//! Concrete service implementations for the HTTP worker

pub mod commander;

#[cfg(test)]
mod tests;

pub use commander::RealServiceCommander;
