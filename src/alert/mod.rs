pub mod message;
pub mod resource;
