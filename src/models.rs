use serde::{Deserialize, Serialize};

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// One entry of a catalog `results` array, kept as the API sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl MovieRecord {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{POSTER_BASE}{p}"))
    }

    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(v) if v != 0.0 => format!("{v:.1}"),
            _ => "N/A".to_string(),
        }
    }

    pub fn release_year(&self) -> String {
        self.release_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .and_then(|d| d.split('-').next())
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

/// Persisted popularity counter for one exact search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub id: String,
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    pub poster_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_sparse_result() {
        let value = json!({ "id": 42, "title": "Eega", "vote_average": 7.2 });
        let movie: MovieRecord = serde_json::from_value(value).expect("movie deserialize");
        assert_eq!(movie.id, 42);
        assert_eq!(movie.popularity, None);
        assert_eq!(movie.vote_count, None);
        assert_eq!(movie.poster_url(), None);
    }

    #[test]
    fn display_helpers_fall_back_to_na() {
        let movie = MovieRecord {
            id: 1,
            title: Some("Magadheera".to_string()),
            original_language: Some("te".to_string()),
            overview: None,
            poster_path: Some("/abc.jpg".to_string()),
            vote_average: Some(7.26),
            popularity: None,
            vote_count: None,
            release_date: Some("2009-07-31".to_string()),
        };
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(movie.rating_label(), "7.3");
        assert_eq!(movie.release_year(), "2009");

        let bare = MovieRecord {
            vote_average: None,
            release_date: Some(String::new()),
            ..movie
        };
        assert_eq!(bare.rating_label(), "N/A");
        assert_eq!(bare.release_year(), "N/A");
    }
}
