pub mod assistant;
pub mod dialogue;
pub mod quiz;
pub mod settings;
