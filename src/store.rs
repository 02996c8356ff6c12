use std::collections::BTreeSet;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, sea_query::OnConflict,
};
use tracing::debug;

use crate::{
    entities::{movie, movie_genre},
    models::{GenreId, Movie, MoviePatch},
};

/// Row-level access to the `movies` and `movie_genres` tables.
///
/// Lookups by id report a missing row as `None`. Every other failure is the
/// store's own error, returned untouched.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn create_movie(
        &self,
        title: &str,
        language: &str,
        region: &str,
        release_year: i32,
        rating: f64,
    ) -> Result<Movie, DbErr>;

    async fn get_movie_by_id(&self, movie_id: i32) -> Result<Option<Movie>, DbErr>;

    /// Movies in ascending id order, at most `limit` of them.
    async fn list_movies(&self, limit: u64) -> Result<Vec<Movie>, DbErr>;

    async fn update_movie(
        &self,
        movie_id: i32,
        patch: MoviePatch,
    ) -> Result<Option<Movie>, DbErr>;

    /// Returns the row as it was read before the delete was issued.
    async fn delete_movie(&self, movie_id: i32) -> Result<Option<Movie>, DbErr>;

    /// Links `movie_id` to each genre. Links that already exist are kept as-is.
    async fn add_genres_to_movie(
        &self,
        movie_id: i32,
        genre_ids: &[GenreId],
    ) -> Result<(), DbErr>;

    async fn get_genres_of_movie(&self, movie_id: i32) -> Result<BTreeSet<GenreId>, DbErr>;

    async fn remove_genres_from_movie(&self, movie_id: i32) -> Result<(), DbErr>;

    /// Distinct movies linked to any of `genre_ids`, ascending id order,
    /// capped at `limit` movies.
    async fn get_movies_by_genres(
        &self,
        genre_ids: &[GenreId],
        limit: u64,
    ) -> Result<Vec<Movie>, DbErr>;

    async fn get_movies_by_genre(
        &self,
        genre_id: GenreId,
        limit: u64,
    ) -> Result<Vec<Movie>, DbErr> {
        self.get_movies_by_genres(&[genre_id], limit).await
    }
}

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieStore for SeaOrmStore {
    async fn create_movie(
        &self,
        title: &str,
        language: &str,
        region: &str,
        release_year: i32,
        rating: f64,
    ) -> Result<Movie, DbErr> {
        let model = movie::ActiveModel {
            movie_id: Default::default(),
            title: Set(title.to_string()),
            language: Set(language.to_string()),
            region: Set(region.to_string()),
            release_year: Set(release_year),
            rating: Set(rating),
            platform: Set(None),
        };

        let movie_id = movie::Entity::insert(model).exec(&self.db).await?.last_insert_id;
        debug!(movie_id = movie_id, title = %title, "inserted movie");

        self.get_movie_by_id(movie_id).await?.ok_or_else(|| {
            DbErr::RecordNotFound(format!("movie {movie_id} missing right after insert"))
        })
    }

    async fn get_movie_by_id(&self, movie_id: i32) -> Result<Option<Movie>, DbErr> {
        let row = movie::Entity::find_by_id(movie_id).one(&self.db).await?;
        Ok(row.map(Movie::from))
    }

    async fn list_movies(&self, limit: u64) -> Result<Vec<Movie>, DbErr> {
        let rows = movie::Entity::find()
            .order_by_asc(movie::Column::MovieId)
            .limit(limit)
            .all(&self.db)
            .await?;
        debug!(limit = limit, fetched = rows.len(), "listed movies");
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn update_movie(
        &self,
        movie_id: i32,
        patch: MoviePatch,
    ) -> Result<Option<Movie>, DbErr> {
        let mut model = movie::ActiveModel::default();
        let mut changed = false;

        if let Some(title) = patch.title {
            model.title = Set(title);
            changed = true;
        }
        if let Some(language) = patch.language {
            model.language = Set(language);
            changed = true;
        }
        if let Some(region) = patch.region {
            model.region = Set(region);
            changed = true;
        }
        if let Some(release_year) = patch.release_year {
            model.release_year = Set(release_year);
            changed = true;
        }
        if let Some(rating) = patch.rating {
            model.rating = Set(rating);
            changed = true;
        }
        if let Some(platform) = patch.platform {
            model.platform = Set(platform);
            changed = true;
        }

        if changed {
            let res = movie::Entity::update_many()
                .set(model)
                .filter(movie::Column::MovieId.eq(movie_id))
                .exec(&self.db)
                .await?;
            debug!(movie_id = movie_id, rows = res.rows_affected, "updated movie");
        }

        self.get_movie_by_id(movie_id).await
    }

    async fn delete_movie(&self, movie_id: i32) -> Result<Option<Movie>, DbErr> {
        let snapshot = self.get_movie_by_id(movie_id).await?;
        let res = movie::Entity::delete_by_id(movie_id).exec(&self.db).await?;
        debug!(movie_id = movie_id, rows = res.rows_affected, "deleted movie");
        Ok(snapshot)
    }

    async fn add_genres_to_movie(
        &self,
        movie_id: i32,
        genre_ids: &[GenreId],
    ) -> Result<(), DbErr> {
        let unique: BTreeSet<GenreId> = genre_ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(());
        }

        let rows = unique.iter().map(|&genre_id| movie_genre::ActiveModel {
            movie_id: Set(movie_id),
            genre_id: Set(genre_id),
        });

        let inserted = movie_genre::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([movie_genre::Column::MovieId, movie_genre::Column::GenreId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        debug!(movie_id = movie_id, requested = unique.len(), inserted, "linked genres");

        Ok(())
    }

    async fn get_genres_of_movie(&self, movie_id: i32) -> Result<BTreeSet<GenreId>, DbErr> {
        let ids: Vec<GenreId> = movie_genre::Entity::find()
            .select_only()
            .column(movie_genre::Column::GenreId)
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn remove_genres_from_movie(&self, movie_id: i32) -> Result<(), DbErr> {
        let res = movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .exec(&self.db)
            .await?;
        debug!(movie_id = movie_id, rows = res.rows_affected, "unlinked genres");
        Ok(())
    }

    async fn get_movies_by_genres(
        &self,
        genre_ids: &[GenreId],
        limit: u64,
    ) -> Result<Vec<Movie>, DbErr> {
        if genre_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = movie::Entity::find()
            .join(JoinType::InnerJoin, movie::Relation::MovieGenre.def())
            .filter(movie_genre::Column::GenreId.is_in(genre_ids.iter().copied()))
            .distinct()
            .order_by_asc(movie::Column::MovieId)
            .limit(limit)
            .all(&self.db)
            .await?;
        debug!(genres = ?genre_ids, limit = limit, fetched = rows.len(), "fetched movies by genre");

        Ok(rows.into_iter().map(Movie::from).collect())
    }
}
