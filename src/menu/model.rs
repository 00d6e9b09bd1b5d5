//! In-memory menu model
//!
//! Categories keep their drinks in display order. Nothing here is mutated
//! after decoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named group of drinks, shown as one grid section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkCategory {
    pub name: String,
    pub drinks: Vec<Drink>,
}

impl DrinkCategory {
    pub fn new(name: impl Into<String>, drinks: Vec<Drink>) -> Self {
        Self {
            name: name.into(),
            drinks,
        }
    }
}

/// A single drink on the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub name: String,
    /// Medium cup price
    pub price_m: Option<u32>,
    /// Large cup price
    pub price_l: Option<u32>,
    pub description: String,
    pub thumbnail_url: String,
    pub image_url: String,
}

impl Drink {
    /// Price pair as a tagged value
    pub fn price_tag(&self) -> PriceTag {
        PriceTag::from_prices(self.price_m, self.price_l)
    }

    /// Label shown under the drink name
    pub fn price_label(&self) -> String {
        self.price_tag().to_string()
    }
}

/// Which cup sizes a drink is sold in, with their prices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTag {
    Both { medium: u32, large: u32 },
    MediumOnly(u32),
    LargeOnly(u32),
    /// No price listed. Renders as an empty label.
    Neither,
}

impl PriceTag {
    pub fn from_prices(medium: Option<u32>, large: Option<u32>) -> Self {
        match (medium, large) {
            (Some(medium), Some(large)) => PriceTag::Both { medium, large },
            (Some(medium), None) => PriceTag::MediumOnly(medium),
            (None, Some(large)) => PriceTag::LargeOnly(large),
            (None, None) => PriceTag::Neither,
        }
    }
}

impl fmt::Display for PriceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceTag::Both { medium, large } => write!(f, "M {} / L {}", medium, large),
            PriceTag::MediumOnly(medium) => write!(f, "M {}", medium),
            PriceTag::LargeOnly(large) => write!(f, "L {}", large),
            PriceTag::Neither => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_labels() {
        assert_eq!(PriceTag::from_prices(Some(50), Some(65)).to_string(), "M 50 / L 65");
        assert_eq!(PriceTag::from_prices(Some(50), None).to_string(), "M 50");
        assert_eq!(PriceTag::from_prices(None, Some(65)).to_string(), "L 65");
        assert_eq!(PriceTag::from_prices(None, None).to_string(), "");
    }

    #[test]
    fn test_drink_price_label() {
        let drink = fixtures::drink("Taro Milk", Some(55), None);
        assert_eq!(drink.price_tag(), PriceTag::MediumOnly(55));
        assert_eq!(drink.price_label(), "M 55");
    }
}
