pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod producer;
pub mod retention;
pub mod storage;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod testutil;
