//! Built-in filters

pub mod key;

pub use key::KeyFilter;
