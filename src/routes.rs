use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::{Form, Query};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    catalog::{DEFAULT_FETCH_CAP, DEFAULT_MIN_RATING, DEFAULT_RECOMMENDATION_LIMIT},
    error::{AppResult, CatalogError},
    models::{GenreId, MovieForm, SearchCriteria},
    templates,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/movies", get(movies_page).post(create_movie))
        .route("/movies/new", get(new_movie))
        .route("/recommendations", get(recommendations_page))
        .route("/search", get(search_page))
        .route("/fragments/movies", get(movies_fragment))
        .route("/fragments/recommendations", get(recommendations_fragment))
        .route("/fragments/search", get(search_fragment))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn index() -> Html<String> {
    Html(templates::index_page())
}

pub async fn movies_page() -> Html<String> {
    Html(templates::movies_page())
}

pub async fn movies_fragment(State(state): State<Arc<AppState>>) -> Response {
    let result = state.catalog.list_all_movies(DEFAULT_FETCH_CAP).await.map(|movies| {
        templates::movies_fragment("All movies", &movies, "No movies available.")
    });
    fragment(result)
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    genres: Vec<GenreId>,
    #[serde(default)]
    min_rating: Option<String>,
}

impl RecommendationQuery {
    fn min_rating(&self) -> Result<f64, String> {
        match self.min_rating.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_MIN_RATING),
            Some(raw) => raw.parse().map_err(|_| format!("invalid minimum rating: {raw}")),
        }
    }
}

pub async fn recommendations_page(Query(q): Query<RecommendationQuery>) -> Html<String> {
    let submitted = !q.genres.is_empty() || q.min_rating.is_some();
    let url = submitted.then(|| {
        let mut params = genre_params(&q.genres);
        if let Some(min_rating) = &q.min_rating {
            params.push(format!("min_rating={}", urlencoding::encode(min_rating)));
        }
        format!("/fragments/recommendations?{}", params.join("&"))
    });
    let min_rating = q.min_rating.clone().unwrap_or_else(|| DEFAULT_MIN_RATING.to_string());
    Html(templates::recommendations_page(&q.genres, &min_rating, url.as_deref()))
}

pub async fn recommendations_fragment(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RecommendationQuery>,
) -> Response {
    if q.genres.is_empty() {
        return datastar(templates::notice_fragment("Please select at least one genre!"));
    }
    let min_rating = match q.min_rating() {
        Ok(r) => r,
        Err(msg) => return datastar(templates::notice_fragment(&msg)),
    };

    let result = state
        .catalog
        .get_recommendations(&q.genres, min_rating, DEFAULT_RECOMMENDATION_LIMIT)
        .await
        .map(|movies| {
            templates::movies_fragment(
                "Top recommendations",
                &movies,
                "No recommendations found for your criteria.",
            )
        });
    fragment(result)
}

pub async fn search_page(Query(criteria): Query<SearchCriteria>) -> Html<String> {
    let text_filters = [
        ("language", &criteria.language),
        ("region", &criteria.region),
        ("platform", &criteria.platform),
    ];
    let submitted = !criteria.genres.is_empty() || text_filters.iter().any(|(_, v)| v.is_some());
    let url = submitted.then(|| {
        let mut params = genre_params(&criteria.genres);
        for (name, value) in text_filters {
            if let Some(value) = value {
                params.push(format!("{name}={}", urlencoding::encode(value)));
            }
        }
        format!("/fragments/search?{}", params.join("&"))
    });
    Html(templates::search_page(
        &criteria.genres,
        criteria.language.as_deref().unwrap_or_default(),
        criteria.region.as_deref().unwrap_or_default(),
        criteria.platform.as_deref().unwrap_or_default(),
        url.as_deref(),
    ))
}

pub async fn search_fragment(
    State(state): State<Arc<AppState>>,
    Query(criteria): Query<SearchCriteria>,
) -> Response {
    let result = state.catalog.search_movies(&criteria).await.map(|movies| {
        templates::movies_fragment("Found", &movies, "No movies found matching your criteria.")
    });
    fragment(result)
}

pub async fn new_movie() -> Html<String> {
    Html(templates::movie_form_page(&MovieForm::default(), None))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MovieForm>,
) -> AppResult<Response> {
    let new = match form.to_new_movie() {
        Ok(new) => new,
        Err(msg) => return Ok(form_error(StatusCode::UNPROCESSABLE_ENTITY, &form, &msg)),
    };

    match state.catalog.add_movie(new).await {
        Ok(movie) => Ok(Html(templates::movie_added_page(&movie)).into_response()),
        Err(err @ CatalogError::InvalidRating(_)) => {
            Ok(form_error(StatusCode::UNPROCESSABLE_ENTITY, &form, &err.to_string()))
        },
        Err(err @ CatalogError::DuplicateTitle(_)) => {
            Ok(form_error(StatusCode::CONFLICT, &form, &err.to_string()))
        },
        Err(err) => Err(err.into()),
    }
}

fn genre_params(genres: &[GenreId]) -> Vec<String> {
    genres.iter().map(|g| format!("genres={g}")).collect()
}

fn form_error(status: StatusCode, form: &MovieForm, message: &str) -> Response {
    (status, Html(templates::movie_form_page(form, Some(message)))).into_response()
}

fn fragment(result: Result<String, CatalogError>) -> Response {
    let body = match result {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(error = %err, "fragment failed");
            templates::error_fragment(err.to_string())
        },
    };
    datastar(body)
}

fn datastar(body: String) -> Response {
    let mut resp = Html(body).into_response();
    *resp.status_mut() = StatusCode::OK;
    resp.headers_mut()
        .insert("datastar-selector", HeaderValue::from_static("#content"));
    resp.headers_mut()
        .insert("datastar-mode", HeaderValue::from_static("outer"));
    resp
}
