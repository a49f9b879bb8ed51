use std::cmp::Ordering;

use crate::models::MovieRecord;

const TELUGU_CODE: &str = "te";
const TELUGU_WORD: &str = "telugu";
const RATING_THRESHOLD: f64 = 0.5;
const POPULARITY_THRESHOLD: f64 = 10.0;

pub fn is_telugu_relevant(movie: &MovieRecord) -> bool {
    let mentions = |text: Option<&str>| {
        text.map(|t| t.to_lowercase().contains(TELUGU_WORD))
            .unwrap_or(false)
    };
    movie.original_language.as_deref() == Some(TELUGU_CODE)
        || mentions(movie.title.as_deref())
        || mentions(movie.overview.as_deref())
}

/// `Less` puts `a` first. Rating and popularity only decide past their thresholds.
pub fn compare_relevance(a: &MovieRecord, b: &MovieRecord) -> Ordering {
    let rating = b.vote_average.unwrap_or(0.0) - a.vote_average.unwrap_or(0.0);
    if rating.abs() > RATING_THRESHOLD {
        return sign(rating);
    }
    let popularity = b.popularity.unwrap_or(0.0) - a.popularity.unwrap_or(0.0);
    if popularity.abs() > POPULARITY_THRESHOLD {
        return sign(popularity);
    }
    b.vote_count.unwrap_or(0).cmp(&a.vote_count.unwrap_or(0))
}

fn sign(diff: f64) -> Ordering {
    if diff > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Filters search results to Telugu-relevant titles and orders them by relevance.
pub fn rank(results: &[MovieRecord], _query: &str) -> Vec<MovieRecord> {
    let mut ranked: Vec<MovieRecord> = Vec::with_capacity(results.len());
    // The thresholds make the order intransitive, which std's sorts may panic on.
    for movie in results.iter().filter(|m| is_telugu_relevant(m)) {
        let pos = ranked
            .iter()
            .rposition(|placed| compare_relevance(placed, movie) != Ordering::Greater)
            .map_or(0, |i| i + 1);
        ranked.insert(pos, movie.clone());
    }
    ranked
}
