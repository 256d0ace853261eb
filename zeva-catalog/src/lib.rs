pub mod category;
pub mod offer;
pub mod product;
pub mod repository;

pub use category::Category;
pub use offer::{Offer, OfferType};
pub use product::Product;
pub use repository::{CategoryRepository, OfferRepository, ProductRepository};
