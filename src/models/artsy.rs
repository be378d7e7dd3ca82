// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Artsy API payloads and the simplified shapes returned to the frontend.
//!
//! Upstream fields are all optional. Mapping follows "falsy" defaulting: an
//! absent *or empty* string takes the placeholder, and an absent thumbnail
//! becomes `null`.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Thumbnail Artsy serves when an artist has no image.
pub const MISSING_IMAGE_MARKER: &str = "missing_image.png";

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ARTWORK: &str = "Unknown Artwork";
const UNKNOWN_DATE: &str = "Unknown Date";
const UNKNOWN_CATEGORY: &str = "Unknown Category";
const UNKNOWN: &str = "Unknown";

// ─── Upstream payloads ───────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Href {
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Option<Href>,
    pub thumbnail: Option<Href>,
}

impl Links {
    fn thumbnail_href(&self) -> Option<String> {
        non_empty(self.thumbnail.as_ref().and_then(|t| t.href.clone()))
    }

    fn self_href(&self) -> Option<&str> {
        self.self_link.as_ref().and_then(|s| s.href.as_deref())
    }
}

/// `{"_embedded": {"<key>": [...]}}` wrapper used by every collection endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Embedded<T> {
    #[serde(rename = "_embedded")]
    pub embedded: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<RawSearchResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResult {
    pub title: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArtist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub nationality: Option<String>,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistList {
    #[serde(default)]
    pub artists: Vec<RawArtist>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArtwork {
    pub id: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtworkList {
    #[serde(default)]
    pub artworks: Vec<RawArtwork>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGene {
    pub name: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneList {
    #[serde(default)]
    pub genes: Vec<RawGene>,
}

// ─── Simplified responses ────────────────────────────────────

/// Search hit or similar artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ArtistDetail {
    pub id: String,
    pub name: String,
    pub nationality: String,
    pub biography: String,
    pub birthday: String,
    pub deathday: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Artwork {
    pub id: String,
    pub title: String,
    pub date: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Category {
    pub name: String,
    pub thumbnail: Option<String>,
}

// ─── Mapping ─────────────────────────────────────────────────

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    non_empty(value).unwrap_or_else(|| default.to_string())
}

/// Last path segment of a self link (`.../artists/4d8b92b3` -> `4d8b92b3`).
pub fn id_from_self_link(href: &str) -> String {
    href.rsplit('/').next().unwrap_or_default().to_string()
}

pub fn map_search_results(results: Vec<RawSearchResult>) -> Vec<ArtistSummary> {
    results
        .into_iter()
        .map(|item| {
            let thumbnail = item
                .links
                .thumbnail_href()
                .filter(|href| !href.contains(MISSING_IMAGE_MARKER));
            ArtistSummary {
                id: item.links.self_href().map(id_from_self_link).unwrap_or_default(),
                name: or_default(item.title, UNKNOWN_ARTIST),
                thumbnail,
            }
        })
        .collect()
}

/// `requested_id` stands in when upstream omits the id.
pub fn map_artist_detail(raw: RawArtist, requested_id: &str) -> ArtistDetail {
    let thumbnail = raw.links.thumbnail_href();
    ArtistDetail {
        id: or_default(raw.id, requested_id),
        name: or_default(raw.name, UNKNOWN_ARTIST),
        nationality: or_default(raw.nationality, UNKNOWN),
        biography: raw.biography.unwrap_or_default(),
        birthday: or_default(raw.birthday, UNKNOWN),
        deathday: or_default(raw.deathday, UNKNOWN),
        thumbnail,
    }
}

pub fn map_similar_artists(artists: Vec<RawArtist>) -> Vec<ArtistSummary> {
    artists
        .into_iter()
        .map(|artist| ArtistSummary {
            thumbnail: artist.links.thumbnail_href(),
            id: artist.id.unwrap_or_default(),
            name: or_default(artist.name, UNKNOWN_ARTIST),
        })
        .collect()
}

pub fn map_artworks(artworks: Vec<RawArtwork>) -> Vec<Artwork> {
    artworks
        .into_iter()
        .map(|artwork| Artwork {
            thumbnail: artwork.links.thumbnail_href(),
            id: artwork.id.unwrap_or_default(),
            title: or_default(artwork.title, UNKNOWN_ARTWORK),
            date: or_default(artwork.date, UNKNOWN_DATE),
        })
        .collect()
}

pub fn map_categories(genes: Vec<RawGene>) -> Vec<Category> {
    genes
        .into_iter()
        .map(|gene| Category {
            thumbnail: gene.links.thumbnail_href(),
            name: or_default(gene.name, UNKNOWN_CATEGORY),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_mapping() {
        let payload: Embedded<SearchResults> = serde_json::from_value(json!({
            "_embedded": {
                "results": [
                    {
                        "title": "Andy Warhol",
                        "_links": {
                            "self": {"href": "https://api.artsy.net/api/artists/4d8b92b34eb68a1b2c0003f4"},
                            "thumbnail": {"href": "https://d32dm0rphc51dk.cloudfront.net/x/square.jpg"}
                        }
                    },
                    {
                        "title": "",
                        "_links": {
                            "self": {"href": "https://api.artsy.net/api/artists/abc"},
                            "thumbnail": {"href": "/assets/shared/missing_image.png"}
                        }
                    }
                ]
            }
        }))
        .unwrap();

        let artists = map_search_results(payload.embedded.unwrap_or_default().results);

        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].id, "4d8b92b34eb68a1b2c0003f4");
        assert_eq!(artists[0].name, "Andy Warhol");
        assert_eq!(
            artists[0].thumbnail.as_deref(),
            Some("https://d32dm0rphc51dk.cloudfront.net/x/square.jpg")
        );
        assert_eq!(artists[1].id, "abc");
        assert_eq!(artists[1].name, "Unknown Artist");
        assert_eq!(artists[1].thumbnail, None);
    }

    #[test]
    fn test_search_without_embedded_is_empty() {
        let payload: Embedded<SearchResults> = serde_json::from_value(json!({})).unwrap();
        assert!(map_search_results(payload.embedded.unwrap_or_default().results).is_empty());
    }

    #[test]
    fn test_artist_detail_defaults() {
        let raw: RawArtist = serde_json::from_value(json!({
            "name": "Frida Kahlo",
            "deathday": "",
            "_links": {}
        }))
        .unwrap();

        let detail = map_artist_detail(raw, "frida-kahlo");

        assert_eq!(
            detail,
            ArtistDetail {
                id: "frida-kahlo".to_string(),
                name: "Frida Kahlo".to_string(),
                nationality: "Unknown".to_string(),
                biography: String::new(),
                birthday: "Unknown".to_string(),
                deathday: "Unknown".to_string(),
                thumbnail: None,
            }
        );
    }

    #[test]
    fn test_artworks_and_categories_defaults() {
        let artworks: ArtworkList = serde_json::from_value(json!({
            "artworks": [
                {"id": "aw1", "title": "Marilyn", "date": "1962",
                 "_links": {"thumbnail": {"href": "https://img/aw1.jpg"}}},
                {"id": "aw2"}
            ]
        }))
        .unwrap();
        let artworks = map_artworks(artworks.artworks);
        assert_eq!(artworks[0].title, "Marilyn");
        assert_eq!(artworks[0].thumbnail.as_deref(), Some("https://img/aw1.jpg"));
        assert_eq!(artworks[1].title, "Unknown Artwork");
        assert_eq!(artworks[1].date, "Unknown Date");
        assert_eq!(artworks[1].thumbnail, None);

        let genes: GeneList =
            serde_json::from_value(json!({"genes": [{"_links": {"thumbnail": {}}}]})).unwrap();
        let categories = map_categories(genes.genes);
        assert_eq!(categories[0].name, "Unknown Category");
        assert_eq!(categories[0].thumbnail, None);
    }

    #[test]
    fn test_id_from_self_link() {
        assert_eq!(id_from_self_link("https://api.artsy.net/api/artists/xyz"), "xyz");
        assert_eq!(id_from_self_link("xyz"), "xyz");
        assert_eq!(id_from_self_link(""), "");
    }
}
