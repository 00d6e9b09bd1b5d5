//! Remote record format
//!
//! The menu endpoint returns a flat list of records, one per drink:
//!
//! ```json
//! { "records": [ { "fields": {
//!     "name": "Pearl Milk Tea", "priceM": 50, "priceL": 65,
//!     "description": "...", "category": "Milk Tea",
//!     "imageURL": "https://...",
//!     "thumbnail": [ { "thumbnails": { "large": { "url": "https://..." } } } ]
//! } } ] }
//! ```
//!
//! Records are grouped into categories by their category string.

use reqwest::Url;
use serde::Deserialize;

use super::model::{Drink, DrinkCategory};
use crate::fetch::FetchError;

/// Top-level payload
#[derive(Debug, Clone, Deserialize)]
pub struct MenuPayload {
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub fields: Fields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fields {
    pub name: String,
    #[serde(default)]
    pub price_m: Option<u32>,
    #[serde(default)]
    pub price_l: Option<u32>,
    pub description: String,
    pub category: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(default)]
    pub thumbnail: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub thumbnails: Sizes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sizes {
    pub large: Details,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Details {
    pub url: String,
}

impl Fields {
    /// Convert into a drink, checking both image URLs
    fn into_drink(self) -> Result<Drink, FetchError> {
        let image_url = checked_url(&self.image_url)?;
        let thumbnail_url = match self.thumbnail.into_iter().next() {
            Some(attachment) => checked_url(&attachment.thumbnails.large.url)?,
            None => {
                log::debug!("No thumbnail for '{}', using full image", self.name);
                image_url.clone()
            }
        };

        Ok(Drink {
            name: self.name,
            price_m: self.price_m,
            price_l: self.price_l,
            description: self.description,
            thumbnail_url,
            image_url,
        })
    }
}

/// Only absolute http(s) URLs are accepted
fn checked_url(raw: &str) -> Result<String, FetchError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url.to_string()),
        _ => Err(FetchError::InvalidUrl(raw.to_string())),
    }
}

/// Decode a raw response body into grouped categories
pub fn decode_menu(body: &[u8]) -> Result<Vec<DrinkCategory>, FetchError> {
    let payload: MenuPayload = serde_json::from_slice(body)?;
    group_records(payload.records)
}

/// Group records by category name.
///
/// Categories are ordered by first appearance; drinks keep payload order.
pub fn group_records(records: Vec<Record>) -> Result<Vec<DrinkCategory>, FetchError> {
    let mut categories: Vec<DrinkCategory> = Vec::new();

    for record in records {
        let category = record.fields.category.clone();
        let drink = record.fields.into_drink()?;

        match categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.drinks.push(drink),
            None => categories.push(DrinkCategory::new(category, vec![drink])),
        }
    }

    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "records": [
            { "id": "rec1", "createdTime": "2022-05-28T00:00:00.000Z", "fields": {
                "name": "Pearl Milk Tea", "priceM": 50, "priceL": 65,
                "description": "Chewy pearls", "category": "Milk Tea",
                "imageURL": "https://img.example.com/full/pearl.png",
                "thumbnail": [ { "id": "att1", "thumbnails": {
                    "small": { "url": "https://img.example.com/s/pearl.png" },
                    "large": { "url": "https://img.example.com/l/pearl.png" }
                } } ]
            } },
            { "fields": {
                "name": "Black Tea", "priceM": 30,
                "description": "Classic", "category": "Tea",
                "imageURL": "https://img.example.com/full/black.png",
                "thumbnail": [ { "thumbnails": { "large": { "url": "https://img.example.com/l/black.png" } } } ]
            } },
            { "fields": {
                "name": "Brown Sugar Latte", "priceL": 70,
                "description": "Sweet", "category": "Milk Tea",
                "imageURL": "https://img.example.com/full/latte.png",
                "thumbnail": []
            } }
        ]
    }"#;

    #[test]
    fn test_decode_groups_by_first_appearance() {
        let categories = decode_menu(PAYLOAD.as_bytes()).unwrap();

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Milk Tea", "Tea"]);

        let milk_tea: Vec<&str> = categories[0].drinks.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(milk_tea, vec!["Pearl Milk Tea", "Brown Sugar Latte"]);
        assert_eq!(categories[1].drinks.len(), 1);
    }

    #[test]
    fn test_decode_optional_prices() {
        let categories = decode_menu(PAYLOAD.as_bytes()).unwrap();

        let pearl = &categories[0].drinks[0];
        assert_eq!((pearl.price_m, pearl.price_l), (Some(50), Some(65)));

        let black = &categories[1].drinks[0];
        assert_eq!((black.price_m, black.price_l), (Some(30), None));

        let latte = &categories[0].drinks[1];
        assert_eq!((latte.price_m, latte.price_l), (None, Some(70)));
    }

    #[test]
    fn test_decode_picks_large_thumbnail() {
        let categories = decode_menu(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(
            categories[0].drinks[0].thumbnail_url,
            "https://img.example.com/l/pearl.png"
        );
    }

    #[test]
    fn test_empty_thumbnail_falls_back_to_image() {
        let categories = decode_menu(PAYLOAD.as_bytes()).unwrap();
        let latte = &categories[0].drinks[1];
        assert_eq!(latte.thumbnail_url, latte.image_url);
    }

    #[test]
    fn test_rejects_relative_url() {
        let body = r#"{ "records": [ { "fields": {
            "name": "Oops", "priceM": 10, "description": "", "category": "Tea",
            "imageURL": "/images/oops.png"
        } } ] }"#;

        match decode_menu(body.as_bytes()) {
            Err(FetchError::InvalidUrl(url)) => assert_eq!(url, "/images/oops.png"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_payload() {
        let result = decode_menu(br#"{ "rows": [] }"#);
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_empty_records() {
        let categories = decode_menu(br#"{ "records": [] }"#).unwrap();
        assert!(categories.is_empty());
    }
}
