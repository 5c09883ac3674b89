// Domain layer - Core business logic

pub mod errors;
pub mod links;
pub mod model;
pub mod rules;
pub mod timecode;
