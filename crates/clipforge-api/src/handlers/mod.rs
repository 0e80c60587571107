pub mod actions;
pub mod assets;
pub mod health;
pub mod transform;
pub mod upload;
