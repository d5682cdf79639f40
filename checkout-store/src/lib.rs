pub mod app_config;
pub mod json_store;
pub mod stripe;

pub use json_store::JsonFileOrderStore;
pub use stripe::StripeClient;
