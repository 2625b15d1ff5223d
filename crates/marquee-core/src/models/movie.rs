use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Actor, Genre, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub genre: Genre,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Average review rating, computed by the server
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub resume: Option<String>,
}

impl Movie {
    pub fn actor_names(&self) -> Vec<&str> {
        self.actors.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Movies reference their genre and cast by id when written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub genre: i64,
    #[serde(default)]
    pub actors: Vec<i64>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub resume: Option<String>,
}

impl Resource for Movie {
    const PATH: &'static str = "movies";
    type Input = MovieInput;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_input(&self) -> MovieInput {
        MovieInput {
            title: self.title.clone(),
            genre: self.genre.id,
            actors: self.actors.iter().map(|a| a.id).collect(),
            release_date: self.release_date,
            resume: self.resume.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreCount {
    #[serde(rename = "genre__name")]
    pub genre_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub total_movies: u64,
    #[serde(default)]
    pub movies_by_genre: Vec<GenreCount>,
    pub total_reviews: u64,
    /// Null while there are no reviews
    #[serde(default)]
    pub average_stars: Option<f64>,
}

impl MovieStats {
    /// Share of all movies in a genre, in percent
    pub fn genre_share(&self, entry: &GenreCount) -> f64 {
        entry.count as f64 / self.total_movies.max(1) as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIE_JSON: &str = r#"{
        "id": 1,
        "title": "Central do Brasil",
        "genre": {"id": 2, "name": "Drama"},
        "actors": [
            {"id": 3, "name": "Fernanda Montenegro", "birthday": "1929-10-16", "nationality": "BRAZIL"},
            {"id": 5, "name": "Vinícius de Oliveira", "birthday": null, "nationality": "BRAZIL"}
        ],
        "release_date": "1998-04-03",
        "rate": 4.5,
        "resume": null
    }"#;

    #[test]
    fn test_parse_movie() {
        let movie: Movie = serde_json::from_str(MOVIE_JSON).expect("Failed to parse movie JSON");
        assert_eq!(movie.genre.name, "Drama");
        assert_eq!(movie.actor_names(), vec!["Fernanda Montenegro", "Vinícius de Oliveira"]);
        assert_eq!(movie.rate, Some(4.5));
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(1998, 4, 3));
    }

    #[test]
    fn test_movie_to_input_uses_ids() {
        let movie: Movie = serde_json::from_str(MOVIE_JSON).unwrap();
        let input = movie.to_input();
        assert_eq!(input.genre, 2);
        assert_eq!(input.actors, vec![3, 5]);

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["release_date"], "1998-04-03");
        assert!(json["resume"].is_null());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_parse_stats() {
        let json = r#"{
            "total_movies": 4,
            "movies_by_genre": [{"genre__name": "Drama", "count": 3}, {"genre__name": "Comedy", "count": 1}],
            "total_reviews": 0,
            "average_stars": null
        }"#;
        let stats: MovieStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.movies_by_genre[0].genre_name, "Drama");
        assert_eq!(stats.average_stars, None);
        assert_eq!(stats.genre_share(&stats.movies_by_genre[0]), 75.0);
    }

    #[test]
    fn test_genre_share_with_no_movies() {
        let stats = MovieStats {
            total_movies: 0,
            movies_by_genre: vec![],
            total_reviews: 0,
            average_stars: None,
        };
        let entry = GenreCount {
            genre_name: "Drama".to_string(),
            count: 0,
        };
        assert_eq!(stats.genre_share(&entry), 0.0);
    }
}
