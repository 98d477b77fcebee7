pub mod checkout;
pub mod products;

pub use checkout::{parse_checkout_quantity, CheckoutRequest, CheckoutSessionBody};
pub use products::{parse_stock_quantity, NewProduct, ProductDraft, ProductImage, StockUpdate};
