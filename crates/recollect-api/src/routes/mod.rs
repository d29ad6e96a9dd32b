//! Route modules.

pub mod health;
pub mod interview;
pub mod viewer;
