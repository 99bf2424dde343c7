//! Content records served to clients, and the pipeline that produces them.

mod aggregator;
mod normalize;

pub use aggregator::{
    AggregationError, ContentAggregator, ContentListing, SearchOutcome, HISTORY_LIMIT,
    MAX_PERSON_CREDITS, MAX_POPULAR_PER_KIND, MAX_SEARCH_ITEMS,
};
pub use normalize::{
    genre_name, resolve_cast, resolve_countries, resolve_creator, resolve_director,
    resolve_genre_names, RecordNormalizer, DEFAULT_IMAGE_BASE_URL, PLACEHOLDER_POSTER_URL,
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Some(ContentKind::Movie),
            "tv" => Some(ContentKind::Tv),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie or series in the flat shape clients consume.
///
/// Every text field is non-empty: unresolvable values are replaced with a
/// sentinel (`"Unknown"`, `"Unknown Title"`, `"No plot available"`) or, for the
/// poster, a placeholder image URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub title: String,
    pub year: String,
    pub plot: String,
    pub poster: String,
    /// Vote average rendered as decimal text, `"0"` when unrated.
    pub rating: String,
    pub genre: String,
    pub director: String,
    pub actors: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub runtime: String,
    pub country: String,
    pub language: String,
}

impl ContentRecord {
    /// Numeric rating used for ordering; unparseable text counts as zero.
    pub fn rating_value(&self) -> f64 {
        self.rating.parse::<f64>().unwrap_or(0.0)
    }
}
