//! Shared types for flashcard generation: request/response model, errors, config, tool contract.

pub mod card;
pub mod config;
pub mod error;
pub mod tool;
