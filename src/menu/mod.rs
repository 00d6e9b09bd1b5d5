//! Menu data
//!
//! Drinks, their categories, and the remote record format they are decoded from.

pub mod model;
pub mod record;

pub use model::{Drink, DrinkCategory, PriceTag};
pub use record::{decode_menu, group_records, MenuPayload, Record};
