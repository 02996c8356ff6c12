use tracing::{debug, info, warn};

use crate::{
    error::{CatalogError, CatalogResult},
    models::{GenreId, Movie, MoviePatch, NewMovie, SearchCriteria},
    store::MovieStore,
};

pub const DEFAULT_LIST_LIMIT: u64 = 100;
pub const DEFAULT_MIN_RATING: f64 = 7.0;
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
/// Rows read for duplicate checks, searches and recommendations. Movies
/// beyond this many are not seen by those operations.
pub const DEFAULT_FETCH_CAP: u64 = 1000;

pub struct CatalogService<S> {
    store: S,
    fetch_cap: u64,
}

impl<S: MovieStore> CatalogService<S> {
    pub fn new(store: S, fetch_cap: u64) -> Self {
        Self { store, fetch_cap }
    }

    pub async fn add_movie(&self, new: NewMovie) -> CatalogResult<Movie> {
        if !(0.0..=10.0).contains(&new.rating) {
            return Err(CatalogError::InvalidRating(new.rating));
        }

        let existing = self.store.list_movies(self.fetch_cap).await?;
        let wanted = new.title.to_lowercase();
        if existing.iter().any(|m| m.title.to_lowercase() == wanted) {
            return Err(CatalogError::DuplicateTitle(new.title));
        }

        let mut movie = self
            .store
            .create_movie(&new.title, &new.language, &new.region, new.release_year, new.rating)
            .await?;
        info!(movie_id = movie.id, title = %movie.title, "movie added");

        if let Err(err) = self.finish_movie(&mut movie, new.platform, &new.genre_ids).await {
            self.discard(movie.id).await;
            return Err(err.into());
        }

        Ok(movie)
    }

    async fn finish_movie(
        &self,
        movie: &mut Movie,
        platform: Option<String>,
        genre_ids: &[GenreId],
    ) -> Result<(), sea_orm::DbErr> {
        let platform = platform.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        if let Some(platform) = platform {
            self.store.update_movie(movie.id, MoviePatch::platform(platform.clone())).await?;
            movie.platform = Some(platform);
        }

        if !genre_ids.is_empty() {
            self.store.add_genres_to_movie(movie.id, genre_ids).await?;
        }

        Ok(())
    }

    // Compensates a partially created movie. The caller still reports the
    // failure that triggered it.
    async fn discard(&self, movie_id: i32) {
        warn!(movie_id = movie_id, "add failed after insert, removing movie");
        if let Err(err) = self.store.remove_genres_from_movie(movie_id).await {
            warn!(movie_id = movie_id, error = %err, "failed to unlink genres of discarded movie");
        }
        if let Err(err) = self.store.delete_movie(movie_id).await {
            warn!(movie_id = movie_id, error = %err, "failed to delete discarded movie");
        }
    }

    pub async fn list_all_movies(&self, limit: u64) -> CatalogResult<Vec<Movie>> {
        Ok(self.store.list_movies(limit).await?)
    }

    /// Filters run in memory over the first `fetch_cap` movies, so results
    /// keep ascending id order.
    pub async fn search_movies(&self, criteria: &SearchCriteria) -> CatalogResult<Vec<Movie>> {
        let language = non_blank(criteria.language.as_deref()).map(str::to_lowercase);
        let region = non_blank(criteria.region.as_deref()).map(str::to_lowercase);
        let platform = non_blank(criteria.platform.as_deref()).map(str::to_lowercase);

        let movies = self.store.list_movies(self.fetch_cap).await?;
        let scanned = movies.len();

        let candidates: Vec<Movie> = movies
            .into_iter()
            .filter(|m| language.as_ref().is_none_or(|l| m.language.to_lowercase() == *l))
            .filter(|m| region.as_ref().is_none_or(|r| m.region.to_lowercase() == *r))
            .filter(|m| {
                platform.as_ref().is_none_or(|p| {
                    m.platform.as_deref().unwrap_or_default().to_lowercase().contains(p.as_str())
                })
            })
            .collect();

        if criteria.genres.is_empty() {
            debug!(scanned = scanned, matched = candidates.len(), "search finished");
            return Ok(candidates);
        }

        let mut results = Vec::with_capacity(candidates.len());
        for movie in candidates {
            let genres = self.store.get_genres_of_movie(movie.id).await?;
            if criteria.genres.iter().any(|g| genres.contains(g)) {
                results.push(movie);
            }
        }

        debug!(scanned = scanned, matched = results.len(), "search finished");
        Ok(results)
    }

    pub async fn get_recommendations(
        &self,
        favorite_genres: &[GenreId],
        min_rating: f64,
        limit: usize,
    ) -> CatalogResult<Vec<Movie>> {
        let movies = self.store.get_movies_by_genres(favorite_genres, self.fetch_cap).await?;

        let mut picks: Vec<Movie> = movies.into_iter().filter(|m| m.rating >= min_rating).collect();
        picks.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        picks.truncate(limit);

        debug!(
            genres = ?favorite_genres,
            min_rating = min_rating,
            count = picks.len(),
            "recommendations ranked"
        );
        Ok(picks)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;
    use sea_orm::DbErr;

    use super::*;
    use crate::{db::testing::temp_db, store::SeaOrmStore};

    fn new_movie(title: &str, rating: f64) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            language: "English".to_string(),
            region: "US".to_string(),
            release_year: 2000,
            rating,
            platform: None,
            genre_ids: Vec::new(),
        }
    }

    async fn service() -> (tempfile::TempDir, CatalogService<SeaOrmStore>) {
        let (dir, store) = raw_store().await;
        (dir, CatalogService::new(store, DEFAULT_FETCH_CAP))
    }

    async fn raw_store() -> (tempfile::TempDir, SeaOrmStore) {
        let (dir, db) = temp_db().await;
        (dir, SeaOrmStore::new(db))
    }

    #[tokio::test]
    async fn rejects_out_of_range_rating_without_writing() {
        let (_dir, catalog) = service().await;

        for rating in [-0.1, 10.01, f64::NAN] {
            let err = catalog.add_movie(new_movie("Bad", rating)).await.unwrap_err();
            assert!(matches!(err, CatalogError::InvalidRating(_)));
            assert!(err.is_rejection());
        }

        assert!(catalog.list_all_movies(DEFAULT_LIST_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn accepts_rating_bounds() {
        let (_dir, catalog) = service().await;
        catalog.add_movie(new_movie("Zero", 0.0)).await.unwrap();
        catalog.add_movie(new_movie("Ten", 10.0)).await.unwrap();
        assert_eq!(catalog.list_all_movies(DEFAULT_LIST_LIMIT).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_duplicate_title_ignoring_case() {
        let (_dir, catalog) = service().await;
        catalog.add_movie(new_movie("X", 5.0)).await.unwrap();

        let err = catalog.add_movie(new_movie("x", 6.0)).await.unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTitle(ref t) if t == "x"));

        assert_eq!(catalog.list_all_movies(DEFAULT_LIST_LIMIT).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_sets_platform_and_genres() {
        let (_dir, store) = raw_store().await;
        let catalog = CatalogService::new(store.clone(), DEFAULT_FETCH_CAP);
        let mut new = new_movie("Arrival", 7.9);
        new.platform = Some("Netflix".to_string());
        new.genre_ids = vec![4, 6];

        let movie = catalog.add_movie(new).await.unwrap();
        assert_eq!(movie.platform.as_deref(), Some("Netflix"));

        let stored = store.get_movie_by_id(movie.id).await.unwrap().unwrap();
        assert_eq!(stored, movie);
        let genres = store.get_genres_of_movie(movie.id).await.unwrap();
        assert_eq!(genres, BTreeSet::from([4, 6]));
    }

    #[tokio::test]
    async fn blank_platform_is_ignored() {
        let (_dir, catalog) = service().await;
        let mut new = new_movie("Blank", 5.0);
        new.platform = Some("  ".to_string());

        let movie = catalog.add_movie(new).await.unwrap();
        assert_eq!(movie.platform, None);
    }

    #[tokio::test]
    async fn list_respects_limit() {
        let (_dir, catalog) = service().await;
        for i in 0..5 {
            catalog.add_movie(new_movie(&format!("Movie {i}"), 5.0)).await.unwrap();
        }
        let listed = catalog.list_all_movies(3).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Movie 0", "Movie 1", "Movie 2"]);
    }

    async fn seed_search(catalog: &CatalogService<SeaOrmStore>) {
        let rows = [
            ("Amelie", "French", "FR", Some("Netflix"), vec![3, 7]),
            ("Parasite", "Korean", "KR", Some("Hulu"), vec![4, 5]),
            ("Heat", "English", "US", Some("Netflix Premium"), vec![1, 5]),
            ("Up", "English", "US", None, vec![9]),
        ];
        for (title, language, region, platform, genres) in rows {
            catalog
                .add_movie(NewMovie {
                    title: title.to_string(),
                    language: language.to_string(),
                    region: region.to_string(),
                    release_year: 2001,
                    rating: 8.0,
                    platform: platform.map(str::to_string),
                    genre_ids: genres,
                })
                .await
                .unwrap();
        }
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn search_filters_compose_as_intersection() {
        let (_dir, catalog) = service().await;
        seed_search(&catalog).await;

        let all = catalog.search_movies(&SearchCriteria::default()).await.unwrap();
        assert_eq!(titles(&all), ["Amelie", "Parasite", "Heat", "Up"]);

        let english = SearchCriteria { language: Some("ENGLISH".into()), ..Default::default() };
        assert_eq!(titles(&catalog.search_movies(&english).await.unwrap()), ["Heat", "Up"]);

        let netflix = SearchCriteria { platform: Some("netflix".into()), ..Default::default() };
        assert_eq!(titles(&catalog.search_movies(&netflix).await.unwrap()), ["Amelie", "Heat"]);

        let thriller = SearchCriteria { genres: vec![5], ..Default::default() };
        assert_eq!(titles(&catalog.search_movies(&thriller).await.unwrap()), ["Parasite", "Heat"]);

        let combined = SearchCriteria {
            genres: vec![5],
            language: Some("english".into()),
            region: Some("us".into()),
            platform: Some("NETFLIX".into()),
        };
        assert_eq!(titles(&catalog.search_movies(&combined).await.unwrap()), ["Heat"]);

        let no_region = SearchCriteria {
            genres: vec![5],
            region: Some("JP".into()),
            ..Default::default()
        };
        assert!(catalog.search_movies(&no_region).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_blank_filters_as_absent() {
        let (_dir, catalog) = service().await;
        seed_search(&catalog).await;

        let blank = SearchCriteria {
            genres: Vec::new(),
            language: Some(String::new()),
            region: Some("  ".into()),
            platform: None,
        };
        assert_eq!(catalog.search_movies(&blank).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn recommendations_are_filtered_sorted_and_capped() {
        let (_dir, catalog) = service().await;
        let rows = [
            ("Low", 6.5, 1),
            ("Mid", 7.5, 1),
            ("High", 9.1, 2),
            ("Tie", 7.5, 2),
            ("Other", 9.9, 3),
        ];
        for (title, rating, genre) in rows {
            let mut new = new_movie(title, rating);
            new.genre_ids = vec![genre];
            catalog.add_movie(new).await.unwrap();
        }

        let recs = catalog.get_recommendations(&[1, 2], 7.0, 10).await.unwrap();
        assert_eq!(titles(&recs), ["High", "Mid", "Tie"]);
        assert!(recs.iter().all(|m| m.rating >= 7.0));

        let top = catalog.get_recommendations(&[1, 2], 7.0, 2).await.unwrap();
        assert_eq!(titles(&top), ["High", "Mid"]);

        assert!(catalog.get_recommendations(&[], 0.0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn movie_in_two_favorite_genres_is_recommended_once() {
        let (_dir, catalog) = service().await;
        let mut new = new_movie("Both", 8.0);
        new.genre_ids = vec![1, 6];
        catalog.add_movie(new).await.unwrap();

        let recs = catalog.get_recommendations(&[1, 6], 7.0, 10).await.unwrap();
        assert_eq!(titles(&recs), ["Both"]);
    }

    #[tokio::test]
    async fn inception_scenario() {
        let (_dir, catalog) = service().await;
        let inception = catalog
            .add_movie(NewMovie {
                title: "Inception".to_string(),
                language: "English".to_string(),
                region: "US".to_string(),
                release_year: 2010,
                rating: 8.8,
                platform: None,
                genre_ids: vec![1, 6],
            })
            .await
            .unwrap();

        let limit = DEFAULT_RECOMMENDATION_LIMIT;
        let recs = catalog.get_recommendations(&[6], 8.0, limit).await.unwrap();
        assert_eq!(recs, vec![inception.clone()]);

        let none = catalog.get_recommendations(&[6], 9.0, limit).await.unwrap();
        assert!(none.is_empty());

        let criteria = SearchCriteria { language: Some("english".into()), ..Default::default() };
        assert_eq!(catalog.search_movies(&criteria).await.unwrap(), vec![inception]);
    }

    struct FailingLinks(SeaOrmStore);

    #[async_trait]
    impl MovieStore for FailingLinks {
        async fn create_movie(
            &self,
            title: &str,
            language: &str,
            region: &str,
            release_year: i32,
            rating: f64,
        ) -> Result<Movie, DbErr> {
            self.0.create_movie(title, language, region, release_year, rating).await
        }

        async fn get_movie_by_id(&self, movie_id: i32) -> Result<Option<Movie>, DbErr> {
            self.0.get_movie_by_id(movie_id).await
        }

        async fn list_movies(&self, limit: u64) -> Result<Vec<Movie>, DbErr> {
            self.0.list_movies(limit).await
        }

        async fn update_movie(
            &self,
            movie_id: i32,
            patch: MoviePatch,
        ) -> Result<Option<Movie>, DbErr> {
            self.0.update_movie(movie_id, patch).await
        }

        async fn delete_movie(&self, movie_id: i32) -> Result<Option<Movie>, DbErr> {
            self.0.delete_movie(movie_id).await
        }

        async fn add_genres_to_movie(
            &self,
            _movie_id: i32,
            _genre_ids: &[GenreId],
        ) -> Result<(), DbErr> {
            Err(DbErr::Custom("link table unavailable".to_string()))
        }

        async fn get_genres_of_movie(&self, movie_id: i32) -> Result<BTreeSet<GenreId>, DbErr> {
            self.0.get_genres_of_movie(movie_id).await
        }

        async fn remove_genres_from_movie(&self, movie_id: i32) -> Result<(), DbErr> {
            self.0.remove_genres_from_movie(movie_id).await
        }

        async fn get_movies_by_genres(
            &self,
            genre_ids: &[GenreId],
            limit: u64,
        ) -> Result<Vec<Movie>, DbErr> {
            self.0.get_movies_by_genres(genre_ids, limit).await
        }
    }

    #[tokio::test]
    async fn failed_genre_insert_removes_the_new_movie() {
        let (_dir, store) = raw_store().await;
        let catalog = CatalogService::new(FailingLinks(store), DEFAULT_FETCH_CAP);

        let mut new = new_movie("Half Made", 7.0);
        new.platform = Some("Max".to_string());
        new.genre_ids = vec![2];

        let err = catalog.add_movie(new.clone()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Store(DbErr::Custom(_))));
        assert!(!err.is_rejection());
        assert!(catalog.list_all_movies(DEFAULT_LIST_LIMIT).await.unwrap().is_empty());

        new.genre_ids.clear();
        catalog.add_movie(new).await.unwrap();
    }
}
