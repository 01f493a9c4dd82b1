pub mod classify;
pub mod search;
