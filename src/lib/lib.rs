pub mod adapters;
pub mod config;
pub mod domain;
pub mod service;
pub mod storage;

#[cfg(test)]
mod tests;
