pub mod auth;
pub mod catalog;
pub mod profile;
pub mod project;
pub mod upload;
