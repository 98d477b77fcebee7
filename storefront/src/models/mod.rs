pub mod image;
pub mod payment;
pub mod product;

pub use image::ImageRef;
pub use payment::{status_tone, Payment, PaymentId, PaymentStatus, StatusTone};
pub use product::{Product, ProductId};
