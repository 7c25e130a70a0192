//! Business logic on top of the store traits

pub mod catalog;
pub mod images;
pub mod orders;
pub mod otp;
pub mod profile;

pub use catalog::{CatalogService, ImageUpload, MenuItemForm};
pub use images::ImageStore;
pub use orders::OrderService;
pub use otp::OtpService;
