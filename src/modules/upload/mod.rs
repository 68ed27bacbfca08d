pub mod controller;
pub mod crud;
pub mod routes;

pub use controller::{check_image_url, discard_file, store_image};
pub use routes::upload_routes;
