// src/lib.rs

pub mod backend;
pub mod config;
pub mod error;
pub mod field;
pub mod hierarchy;
pub mod pgm;
pub mod solver;
pub mod visualisation;
