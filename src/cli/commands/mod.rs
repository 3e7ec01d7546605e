pub mod resource;
pub mod seed;
pub mod tasks;
pub mod upload;
