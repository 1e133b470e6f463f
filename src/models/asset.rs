//! Catalog asset model: a generic item in the library catalog whose
//! concrete payload is selected by its category.
//!
//! The payload is a tagged variant: serialization inspects `category`
//! first and selects the matching `info` shape, so an asset whose payload
//! does not correspond to a known category is unrepresentable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// The classification of a catalog asset. Mirrors the tags of
/// [`AssetInfo`] for storage columns and filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    Book,
    Magazine,
    NewsPaper,
    Dvd,
    Cd,
    VideoGame,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Book => "BOOK",
            AssetCategory::Magazine => "MAGAZINE",
            AssetCategory::NewsPaper => "NEWS_PAPER",
            AssetCategory::Dvd => "DVD",
            AssetCategory::Cd => "CD",
            AssetCategory::VideoGame => "VIDEO_GAME",
        }
    }
}

/// A generic item in the library catalog. It can hold any type of media
/// such as books, magazines, DVDs, etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Concrete asset data together with its category tag; flattened so
    /// the wire shape is `{id, created_at, updated_at, category, info}`.
    #[serde(flatten)]
    pub info: AssetInfo,
}

impl Asset {
    /// Create a new catalog asset from the concrete media payload. The
    /// identifier and both timestamps are assigned here; creation and
    /// update instants are equal for a fresh asset.
    pub fn build(info: AssetInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            info,
        }
    }

    pub fn category(&self) -> AssetCategory {
        self.info.category()
    }
}

/// Concrete asset data, discriminated by the `category` tag on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category", content = "info")]
pub enum AssetInfo {
    #[serde(rename = "BOOK")]
    Book(Book),
    #[serde(rename = "MAGAZINE")]
    Magazine(Magazine),
    #[serde(rename = "NEWS_PAPER")]
    NewsPaper(NewsPaper),
    #[serde(rename = "DVD")]
    Dvd(Dvd),
    #[serde(rename = "CD")]
    Cd(Cd),
    #[serde(rename = "VIDEO_GAME")]
    VideoGame(VideoGame),
}

impl AssetInfo {
    pub fn category(&self) -> AssetCategory {
        match self {
            AssetInfo::Book(_) => AssetCategory::Book,
            AssetInfo::Magazine(_) => AssetCategory::Magazine,
            AssetInfo::NewsPaper(_) => AssetCategory::NewsPaper,
            AssetInfo::Dvd(_) => AssetCategory::Dvd,
            AssetInfo::Cd(_) => AssetCategory::Cd,
            AssetInfo::VideoGame(_) => AssetCategory::VideoGame,
        }
    }

    /// The bare payload object, without the category tag. This is what
    /// the storage layer persists next to the category column.
    pub fn payload(&self) -> AppResult<serde_json::Value> {
        let tagged = serde_json::to_value(self)
            .map_err(|e| AppError::Internal(format!("error encoding asset info: {e}")))?;
        tagged
            .get("info")
            .cloned()
            .ok_or_else(|| AppError::Internal("asset info payload missing".to_string()))
    }

    /// Rebuild the tagged payload from a stored category string and the
    /// bare payload object.
    pub fn decode(category: &str, payload: serde_json::Value) -> AppResult<Self> {
        serde_json::from_value(json!({ "category": category, "info": payload }))
            .map_err(|e| AppError::Internal(format!("error decoding asset info: {e}")))
    }
}

/// A book available in the library catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub publisher: String,
    /// International Standard Book Number.
    pub isbn: String,
    pub page_count: i32,
    pub published_at: DateTime<Utc>,
}

/// A magazine issue in the library catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Magazine {
    pub title: String,
    /// Specific issue identifier, e.g. "May 2025".
    pub issue: String,
    pub publisher: String,
    pub published_at: DateTime<Utc>,
    pub page_count: i32,
}

/// A newspaper edition in the library catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsPaper {
    pub title: String,
    /// Specific edition identifier, e.g. "Morning Edition".
    pub edition: String,
    pub publisher: String,
    pub published_at: DateTime<Utc>,
    pub page_count: i32,
}

/// A digital video disc in the library catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dvd {
    pub title: String,
    pub director: String,
    pub producer: String,
    pub duration_min: i32,
    /// DVD region code, e.g. "Region 1".
    pub region_code: String,
    pub released_at: DateTime<Utc>,
}

/// A compact disc in the library catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cd {
    pub title: String,
    pub artist: String,
    pub label: String,
    pub track_count: i32,
    pub duration_min: i32,
    pub released_at: DateTime<Utc>,
}

/// A video game item in the library catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoGame {
    pub title: String,
    pub developer: String,
    /// Platform the game runs on, e.g. "PlayStation", "PC".
    pub platform: String,
    pub genre: String,
    pub released_at: DateTime<Utc>,
    /// Age rating, e.g. "E", "T", "M".
    pub age_rating: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn book() -> AssetInfo {
        AssetInfo::Book(Book {
            title: "1984".to_string(),
            author: "George Orwell".to_string(),
            publisher: "Secker & Warburg".to_string(),
            isbn: "978-0451524935".to_string(),
            page_count: 328,
            published_at: Utc.with_ymd_and_hms(1949, 6, 8, 0, 0, 0).unwrap(),
        })
    }

    #[test]
    fn build_assigns_id_and_equal_timestamps() {
        let asset = Asset::build(book());
        assert!(!asset.id.is_nil());
        assert_eq!(asset.created_at, asset.updated_at);
        assert_eq!(asset.category(), AssetCategory::Book);
    }

    #[test]
    fn wire_shape_carries_category_next_to_info() {
        let asset = Asset::build(book());
        let value = serde_json::to_value(&asset).unwrap();

        assert_eq!(value["category"], "BOOK");
        assert_eq!(value["info"]["title"], "1984");
        assert_eq!(value["info"]["page_count"], 328);
        assert_eq!(value["info"]["published_at"], "1949-06-08T00:00:00Z");
        assert_eq!(value["id"], asset.id.to_string());
    }

    #[test]
    fn request_decodes_payload_selected_by_category() {
        let body = json!({
            "category": "DVD",
            "info": {
                "title": "Alien",
                "director": "Ridley Scott",
                "producer": "Gordon Carroll",
                "duration_min": 117,
                "region_code": "Region 2",
                "released_at": "1979-05-25T00:00:00Z"
            }
        });

        let info: AssetInfo = serde_json::from_value(body).unwrap();
        assert_eq!(info.category(), AssetCategory::Dvd);
        match info {
            AssetInfo::Dvd(dvd) => assert_eq!(dvd.director, "Ridley Scott"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let body = json!({ "category": "VINYL", "info": { "title": "Kind of Blue" } });
        assert!(serde_json::from_value::<AssetInfo>(body).is_err());
    }

    #[test]
    fn payload_mismatching_category_is_rejected() {
        // A BOOK payload must carry the book fields, not the CD ones.
        let body = json!({
            "category": "BOOK",
            "info": {
                "title": "Kind of Blue",
                "artist": "Miles Davis",
                "label": "Columbia",
                "track_count": 5,
                "duration_min": 45,
                "released_at": "1959-08-17T00:00:00Z"
            }
        });
        assert!(serde_json::from_value::<AssetInfo>(body).is_err());
    }

    #[test]
    fn storage_payload_round_trip() {
        let info = book();
        let payload = info.payload().unwrap();
        // The stored payload is the bare object.
        assert!(payload.get("category").is_none());
        assert_eq!(payload["isbn"], "978-0451524935");

        let decoded = AssetInfo::decode("BOOK", payload).unwrap();
        assert_eq!(decoded.category(), AssetCategory::Book);
    }

    #[test]
    fn decode_rejects_unknown_stored_category() {
        let err = AssetInfo::decode("VINYL", json!({})).unwrap_err();
        assert!(err.to_string().contains("error decoding asset info"));
    }

    #[test]
    fn every_category_round_trips() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let infos = vec![
            book(),
            AssetInfo::Magazine(Magazine {
                title: "National Geographic".to_string(),
                issue: "May 2025".to_string(),
                publisher: "NatGeo".to_string(),
                published_at: now,
                page_count: 90,
            }),
            AssetInfo::NewsPaper(NewsPaper {
                title: "The Times".to_string(),
                edition: "Morning Edition".to_string(),
                publisher: "Times Group".to_string(),
                published_at: now,
                page_count: 40,
            }),
            AssetInfo::Cd(Cd {
                title: "Kind of Blue".to_string(),
                artist: "Miles Davis".to_string(),
                label: "Columbia".to_string(),
                track_count: 5,
                duration_min: 45,
                released_at: now,
            }),
            AssetInfo::VideoGame(VideoGame {
                title: "Outer Wilds".to_string(),
                developer: "Mobius Digital".to_string(),
                platform: "PC".to_string(),
                genre: "Adventure".to_string(),
                released_at: now,
                age_rating: "E".to_string(),
            }),
        ];

        for info in infos {
            let category = info.category();
            let payload = info.payload().unwrap();
            let decoded = AssetInfo::decode(category.as_str(), payload).unwrap();
            assert_eq!(decoded.category(), category);
        }
    }
}
