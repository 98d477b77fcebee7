pub mod checkout;
pub mod gateway;
pub mod http;
pub mod metrics;

pub use checkout::{CheckoutInitiator, CheckoutRedirect, HttpCheckoutInitiator};
pub use gateway::{HttpInventoryGateway, InventoryGateway};
