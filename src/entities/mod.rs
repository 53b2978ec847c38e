pub mod client;
pub mod order;
pub mod order_item;
pub mod product;
pub mod project;
pub mod project_template;
pub mod user;
