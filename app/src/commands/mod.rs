pub mod chat;
pub mod config;
pub mod interviews;
pub mod personas;
pub mod product;
pub mod report;
pub mod segments;
