pub mod customer;
pub mod ingredient;
pub mod menu_item;
pub mod menu_item_ingredient;
pub mod order;
pub mod order_item;
pub mod store;
