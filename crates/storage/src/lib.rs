#![forbid(unsafe_code)]

pub mod fixtures;
pub mod record;
pub mod repository;
pub mod sqlite;
