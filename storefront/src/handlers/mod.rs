pub mod app;
pub mod inventory;
pub mod payments;
pub mod sections;
