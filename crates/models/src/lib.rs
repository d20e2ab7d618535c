pub mod errors;
pub mod db;
pub mod slug;
pub mod category;
pub mod product;
pub mod product_category;
