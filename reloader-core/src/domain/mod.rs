//! Core domain types
//!
//! These types describe what the pipeline talks about: images, containers and
//! the lifecycle of a single run. They are shared between the engine, the
//! concrete steps and the HTTP layer.

pub mod container;
pub mod image;
pub mod run;
