//! Wire models for the TMDB v3 API.
//!
//! TMDB omits or nulls fields freely, so every record tolerates missing
//! values and every list field decodes `null` as empty.

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Genre {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CastMember {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub character: Option<String>,
    pub order: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrewMember {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job: String,
    pub department: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Credits {
    #[serde(deserialize_with = "null_as_default")]
    pub cast: Vec<CastMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Creator {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductionCountry {
    #[serde(deserialize_with = "null_as_default")]
    pub iso_3166_1: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// A movie as returned by search, popular, discover or the details endpoint.
/// Detail-only fields (`genres`, `credits`, `runtime`, `production_countries`)
/// are empty on list results.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovieRecord {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    /// Kept as the wire number so integral averages render without a
    /// fractional part.
    pub vote_average: Option<Number>,
    pub popularity: Option<f64>,
    pub original_language: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    pub credits: Option<Credits>,
    pub runtime: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub production_countries: Vec<ProductionCountry>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeriesRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<Number>,
    pub popularity: Option<f64>,
    pub original_language: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_by: Vec<Creator>,
    pub credits: Option<Credits>,
    #[serde(deserialize_with = "null_as_default")]
    pub episode_run_time: Vec<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub production_countries: Vec<ProductionCountry>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersonRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub popularity: Option<f64>,
    pub known_for_department: Option<String>,
}

/// One entry of a multi-search or a combined-credits listing, discriminated
/// by its `media_type` field.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum MediaItem {
    Movie(MovieRecord),
    Tv(SeriesRecord),
    Person(PersonRecord),
}

impl MediaItem {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenreList {
    #[serde(deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
}

/// A person's cast and crew credits. Entries are kept as raw JSON so they can
/// be ranked by popularity before being interpreted as movies or series.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CombinedCredits {
    #[serde(deserialize_with = "null_as_default")]
    pub cast: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub crew: Vec<Value>,
}
