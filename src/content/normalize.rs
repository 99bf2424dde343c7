//! Conversion of raw TMDB records into [`ContentRecord`]s.
//!
//! Nothing in here fails: missing upstream data turns into sentinel strings.

use super::{ContentKind, ContentRecord};
use crate::tmdb::{Credits, Creator, Genre, MovieRecord, ProductionCountry, SeriesRecord};
use serde_json::Number;

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const PLACEHOLDER_POSTER_URL: &str =
    "https://images.unsplash.com/photo-1440404653325-ab127d49abc1?w=300&h=450&fit=crop&crop=faces";

const UNKNOWN: &str = "Unknown";
const UNKNOWN_TITLE: &str = "Unknown Title";
const NO_PLOT: &str = "No plot available";

const MAX_GENRES: usize = 3;
const MAX_DIRECTORS: usize = 2;
const MAX_ACTORS: usize = 4;
const MAX_COUNTRIES: usize = 2;
const DEFAULT_EPISODE_RUNTIME_MIN: i64 = 45;

/// TMDB genre ids shared by movies and series, sorted by id.
static GENRE_TABLE: &[(i64, &str)] = &[
    (12, "Adventure"),
    (14, "Fantasy"),
    (16, "Animation"),
    (18, "Drama"),
    (27, "Horror"),
    (28, "Action"),
    (35, "Comedy"),
    (36, "History"),
    (37, "Western"),
    (53, "Thriller"),
    (80, "Crime"),
    (99, "Documentary"),
    (878, "Sci-Fi"),
    (9648, "Mystery"),
    (10402, "Music"),
    (10749, "Romance"),
    (10751, "Family"),
    (10752, "War"),
    (10759, "Action & Adventure"),
    (10762, "Kids"),
    (10763, "News"),
    (10764, "Reality"),
    (10765, "Sci-Fi & Fantasy"),
    (10766, "Soap"),
    (10767, "Talk"),
    (10768, "War & Politics"),
    (10770, "TV Movie"),
];

pub fn genre_name(id: i64) -> Option<&'static str> {
    GENRE_TABLE
        .binary_search_by_key(&id, |(genre_id, _)| *genre_id)
        .ok()
        .map(|index| GENRE_TABLE[index].1)
}

fn join_or_unknown<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> String {
    let names: Vec<&str> = names.filter(|name| !name.is_empty()).take(limit).collect();
    if names.is_empty() {
        UNKNOWN.to_string()
    } else {
        names.join(", ")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn year_of(date: &Option<String>) -> Option<String> {
    non_empty(date).map(|d| d.chars().take(4).collect())
}

fn record_id(id: Option<i64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    }
}

fn format_rating(vote_average: Option<&Number>) -> String {
    match vote_average {
        Some(value) => value.to_string(),
        None => "0".to_string(),
    }
}

fn format_language(language: &Option<String>) -> String {
    language.as_deref().unwrap_or_default().to_uppercase()
}

/// Genres from embedded objects when present, otherwise from the id table.
/// Unmapped ids render as `Genre{id}`.
pub fn resolve_genre_names(ids: &[i64], embedded: &[Genre]) -> String {
    if !embedded.is_empty() {
        return join_or_unknown(embedded.iter().map(|g| g.name.as_str()), MAX_GENRES);
    }

    let names: Vec<String> = ids
        .iter()
        .take(MAX_GENRES)
        .map(|id| match genre_name(*id) {
            Some(name) => name.to_string(),
            None => format!("Genre{}", id),
        })
        .collect();
    if names.is_empty() {
        UNKNOWN.to_string()
    } else {
        names.join(", ")
    }
}

pub fn resolve_director(credits: Option<&Credits>) -> String {
    let crew = credits.map(|c| c.crew.as_slice()).unwrap_or_default();
    join_or_unknown(
        crew.iter()
            .filter(|member| member.job == "Director")
            .map(|member| member.name.as_str()),
        MAX_DIRECTORS,
    )
}

pub fn resolve_creator(creators: &[Creator]) -> String {
    join_or_unknown(creators.iter().map(|c| c.name.as_str()), MAX_DIRECTORS)
}

pub fn resolve_cast(credits: Option<&Credits>) -> String {
    let cast = credits.map(|c| c.cast.as_slice()).unwrap_or_default();
    join_or_unknown(cast.iter().map(|member| member.name.as_str()), MAX_ACTORS)
}

pub fn resolve_countries(countries: &[ProductionCountry]) -> String {
    join_or_unknown(countries.iter().map(|c| c.name.as_str()), MAX_COUNTRIES)
}

/// Builds [`ContentRecord`]s against a fixed image base URL.
#[derive(Clone, Debug)]
pub struct RecordNormalizer {
    image_base_url: String,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE_URL)
    }
}

impl RecordNormalizer {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            image_base_url: image_base_url.into(),
        }
    }

    pub fn build_poster_url(&self, path: Option<&str>) -> String {
        match path {
            Some(path) if !path.is_empty() => format!("{}{}", self.image_base_url, path),
            _ => PLACEHOLDER_POSTER_URL.to_string(),
        }
    }

    pub fn normalize_movie(&self, raw: &MovieRecord) -> ContentRecord {
        let runtime = match raw.runtime {
            Some(minutes) if minutes > 0 => format!("{} min", minutes),
            _ => UNKNOWN.to_string(),
        };

        ContentRecord {
            id: record_id(raw.id),
            title: non_empty(&raw.title).unwrap_or(UNKNOWN_TITLE).to_string(),
            year: year_of(&raw.release_date).unwrap_or_else(|| UNKNOWN.to_string()),
            plot: non_empty(&raw.overview).unwrap_or(NO_PLOT).to_string(),
            poster: self.build_poster_url(raw.poster_path.as_deref()),
            rating: format_rating(raw.vote_average.as_ref()),
            genre: resolve_genre_names(&raw.genre_ids, &raw.genres),
            director: resolve_director(raw.credits.as_ref()),
            actors: resolve_cast(raw.credits.as_ref()),
            kind: ContentKind::Movie,
            runtime,
            country: resolve_countries(&raw.production_countries),
            language: format_language(&raw.original_language),
        }
    }

    pub fn normalize_series(&self, raw: &SeriesRecord) -> ContentRecord {
        let year = match (year_of(&raw.first_air_date), year_of(&raw.last_air_date)) {
            (Some(first), Some(last)) if first != last => format!("{}-{}", first, last),
            (Some(first), _) => first,
            _ => UNKNOWN.to_string(),
        };
        let episode_minutes = raw
            .episode_run_time
            .first()
            .copied()
            .unwrap_or(DEFAULT_EPISODE_RUNTIME_MIN);

        ContentRecord {
            id: record_id(raw.id),
            title: non_empty(&raw.name).unwrap_or(UNKNOWN_TITLE).to_string(),
            year,
            plot: non_empty(&raw.overview).unwrap_or(NO_PLOT).to_string(),
            poster: self.build_poster_url(raw.poster_path.as_deref()),
            rating: format_rating(raw.vote_average.as_ref()),
            genre: resolve_genre_names(&raw.genre_ids, &raw.genres),
            director: resolve_creator(&raw.created_by),
            actors: resolve_cast(raw.credits.as_ref()),
            kind: ContentKind::Tv,
            runtime: format!("{} min per episode", episode_minutes),
            country: resolve_countries(&raw.production_countries),
            language: format_language(&raw.original_language),
        }
    }
}
