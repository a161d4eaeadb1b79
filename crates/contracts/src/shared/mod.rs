pub mod item_naming;
pub mod transliteration;
