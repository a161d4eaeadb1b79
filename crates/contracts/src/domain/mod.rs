pub mod common;

pub mod a025_item_category;
pub mod a026_item_attribute;
pub mod a027_inventory_item;
