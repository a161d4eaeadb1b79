pub mod common;

pub mod u508_create_inventory_item;
