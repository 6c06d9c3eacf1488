#![deny(clippy::all)]

pub mod intensity;
pub mod inventory;
pub mod storage;
