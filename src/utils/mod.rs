pub mod json_heal;

pub use json_heal::heal_json;
