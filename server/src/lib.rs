#[macro_use]
extern crate rocket;

pub mod auth;
pub mod aura;
pub mod db;
pub mod error;
pub mod prometheus;
pub mod store;
pub mod types;
