use serde::{Deserialize, Serialize};

use crate::entities::movie;

/// Genre identifiers are plain integers; the store does not validate them
/// against [`Genre`].
pub type GenreId = i32;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Genre {
    Action,
    Adventure,
    Comedy,
    Drama,
    Thriller,
    SciFi,
    Romance,
    Horror,
    Animation,
    Fantasy,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Comedy,
        Genre::Drama,
        Genre::Thriller,
        Genre::SciFi,
        Genre::Romance,
        Genre::Horror,
        Genre::Animation,
        Genre::Fantasy,
    ];

    pub fn id(self) -> GenreId {
        match self {
            Genre::Action => 1,
            Genre::Adventure => 2,
            Genre::Comedy => 3,
            Genre::Drama => 4,
            Genre::Thriller => 5,
            Genre::SciFi => 6,
            Genre::Romance => 7,
            Genre::Horror => 8,
            Genre::Animation => 9,
            Genre::Fantasy => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Thriller => "Thriller",
            Genre::SciFi => "Sci-Fi",
            Genre::Romance => "Romance",
            Genre::Horror => "Horror",
            Genre::Animation => "Animation",
            Genre::Fantasy => "Fantasy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub language: String,
    pub region: String,
    pub release_year: i32,
    pub rating: f64,
    pub platform: Option<String>,
}

impl From<movie::Model> for Movie {
    fn from(row: movie::Model) -> Self {
        Self {
            id: row.movie_id,
            title: row.title,
            language: row.language,
            region: row.region,
            release_year: row.release_year,
            rating: row.rating,
            platform: row.platform,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub language: String,
    pub region: String,
    pub release_year: i32,
    pub rating: f64,
    pub platform: Option<String>,
    pub genre_ids: Vec<GenreId>,
}

/// Partial update of a movie row. `None` leaves a column untouched;
/// `platform: Some(None)` clears the platform.
#[derive(Clone, Debug, Default)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    pub platform: Option<Option<String>>,
}

impl MoviePatch {
    pub fn platform(platform: impl Into<String>) -> Self {
        Self { platform: Some(Some(platform.into())), ..Default::default() }
    }
}

/// Filters for a catalog search. Empty fields are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub genres: Vec<GenreId>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Raw "add movie" form as submitted from the dashboard.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub release_year: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub genres: Vec<GenreId>,
}

impl MovieForm {
    pub fn to_new_movie(&self) -> Result<NewMovie, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("title is required".to_string());
        }
        let release_year = self
            .release_year
            .trim()
            .parse()
            .map_err(|_| format!("invalid release year: {}", self.release_year))?;
        let rating =
            self.rating.trim().parse().map_err(|_| format!("invalid rating: {}", self.rating))?;

        Ok(NewMovie {
            title: title.to_string(),
            language: self.language.trim().to_string(),
            region: self.region.trim().to_string(),
            release_year,
            rating,
            platform: Some(self.platform.clone()),
            genre_ids: self.genres.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_ids_follow_fixed_numbering() {
        let ids: Vec<GenreId> = Genre::ALL.iter().map(|g| g.id()).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(Genre::SciFi.name(), "Sci-Fi");
    }

    #[test]
    fn movie_form_parses_numbers_and_trims() {
        let form = MovieForm {
            title: " Heat ".to_string(),
            language: "English".to_string(),
            region: "US".to_string(),
            release_year: "1995".to_string(),
            rating: " 8.3".to_string(),
            platform: String::new(),
            genres: vec![1, 5],
        };
        let new = form.to_new_movie().unwrap();
        assert_eq!(new.title, "Heat");
        assert_eq!(new.release_year, 1995);
        assert_eq!(new.rating, 8.3);
        assert_eq!(new.genre_ids, vec![1, 5]);

        let missing = MovieForm { title: "  ".to_string(), ..form.clone() };
        assert_eq!(missing.to_new_movie().unwrap_err(), "title is required");

        let bad_rating = MovieForm { rating: "great".to_string(), ..form };
        assert_eq!(bad_rating.to_new_movie().unwrap_err(), "invalid rating: great");
    }
}
