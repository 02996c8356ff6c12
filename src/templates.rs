use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::models::{Genre, GenreId, Movie, MovieForm};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const DATASTAR_CDN: &str =
    "https://cdn.jsdelivr.net/npm/@sudodevnull/datastar@0.19.9/dist/datastar.js";

pub fn index_page() -> String {
    page(
        "Movie Recommendation System",
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-3xl font-bold text-gray-900" { "Movie Recommendation System" }
                p class="mt-2 text-gray-600" { "Browse the catalog, search it, or get recommendations by genre." }
                ul class="mt-6 space-y-2" {
                    li { a class="text-blue-600 hover:text-blue-800" href="/recommendations" { "Recommendations" } }
                    li { a class="text-blue-600 hover:text-blue-800" href="/movies" { "View all movies" } }
                    li { a class="text-blue-600 hover:text-blue-800" href="/search" { "Search movies" } }
                    li { a class="text-blue-600 hover:text-blue-800" href="/movies/new" { "Add a movie" } }
                }
            }
        },
    )
}

pub fn movies_page() -> String {
    page(
        "All Movies",
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "All Movies" }
            (loading_div("/fragments/movies"))
        },
    )
}

pub fn recommendations_page(
    genres: &[GenreId],
    min_rating: &str,
    fragment_url: Option<&str>,
) -> String {
    page(
        "Recommendations",
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Movie Recommendations" }
            form class="mt-6 bg-white shadow rounded-lg p-6 space-y-4" method="get" action="/recommendations" {
                (genre_checkboxes("Select your favorite genres", genres))
                div {
                    label class="block text-sm font-medium text-gray-700" for="min_rating" { "Minimum rating" }
                    input class="mt-2 w-32 rounded-md border border-gray-300 px-3 py-2" type="number" name="min_rating" id="min_rating" min="0" max="10" step="0.1" value=(min_rating);
                }
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Get Recommendations" }
            }
            @if let Some(url) = fragment_url {
                (loading_div(url))
            }
        },
    )
}

pub fn search_page(
    genres: &[GenreId],
    language: &str,
    region: &str,
    platform: &str,
    fragment_url: Option<&str>,
) -> String {
    page(
        "Search",
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Search Movies" }
            form class="mt-6 bg-white shadow rounded-lg p-6 space-y-4" method="get" action="/search" {
                (genre_checkboxes("Genres (optional)", genres))
                (text_input("language", "Language (optional)", language, false))
                (text_input("region", "Region (optional)", region, false))
                (text_input("platform", "Platform (optional)", platform, false))
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Search" }
            }
            @if let Some(url) = fragment_url {
                (loading_div(url))
            }
        },
    )
}

pub fn movie_form_page(form: &MovieForm, message: Option<&str>) -> String {
    page(
        "Add Movie",
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Add a Movie" }
            @if let Some(message) = message {
                div class="mt-6 rounded-md border border-red-300 bg-red-50 p-4 text-red-800" { (message) }
            }
            form class="mt-6 bg-white shadow rounded-lg p-6 space-y-4" method="post" action="/movies" {
                (text_input("title", "Title", &form.title, true))
                (text_input("language", "Language", &form.language, true))
                (text_input("region", "Region", &form.region, true))
                (text_input("release_year", "Release year", &form.release_year, true))
                (text_input("rating", "Rating (0-10)", &form.rating, true))
                (text_input("platform", "Platform (optional)", &form.platform, false))
                (genre_checkboxes("Genres", &form.genres))
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Add" }
            }
        },
    )
}

pub fn movie_added_page(movie: &Movie) -> String {
    page(
        "Movie Added",
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Movie added" }
            div class="mt-6 grid gap-4 md:grid-cols-3" { (movie_card(movie)) }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/movies/new" { "Add another" }
        },
    )
}

pub fn movies_fragment(heading: &str, movies: &[Movie], empty: &str) -> String {
    content_div(html! {
        @if movies.is_empty() {
            div class="mt-6 bg-white shadow rounded-lg p-8" {
                p class="text-gray-600" { (empty) }
            }
        } @else {
            h2 class="mt-6 text-lg font-semibold text-gray-800" { (heading) " (" (movies.len()) ")" }
            div class="mt-4 grid gap-4 md:grid-cols-3" {
                @for movie in movies {
                    (movie_card(movie))
                }
            }
        }
    })
}

pub fn notice_fragment(message: &str) -> String {
    content_div(html! {
        div class="mt-6 rounded-md border border-yellow-300 bg-yellow-50 p-4 text-yellow-800" { (message) }
    })
}

pub fn error_fragment(message: String) -> String {
    content_div(html! {
        div class="mt-6 bg-white shadow rounded-lg p-8" {
            h2 class="text-2xl font-bold text-gray-900" { "Error" }
            p class="mt-4 text-gray-700" { (message) }
        }
    })
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Error" }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
                script type="module" src=(DATASTAR_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                div class="flex" {
                    (sidebar())
                    main class="flex-1 max-w-5xl px-6 py-10" { (body) }
                }
            }
        }
    }
    .into_string()
}

fn sidebar() -> Markup {
    html! {
        nav class="w-56 min-h-screen bg-white shadow px-4 py-8 space-y-2" {
            a class="block text-lg font-bold text-gray-900" href="/" { "Movies" }
            a class="block text-gray-700 hover:text-blue-600" href="/recommendations" { "Recommendations" }
            a class="block text-gray-700 hover:text-blue-600" href="/movies" { "View All Movies" }
            a class="block text-gray-700 hover:text-blue-600" href="/search" { "Search Movies" }
            a class="block text-gray-700 hover:text-blue-600" href="/movies/new" { "Add Movie" }
        }
    }
}

fn content_div(inner: Markup) -> String {
    html! { div id="content" { (inner) } }.into_string()
}

fn loading_div(url: &str) -> Markup {
    html! {
        div id="content" data-indicator:fetching data-init=(PreEscaped(format!("@get('{}')", url))) {
            div class="mt-6 bg-white shadow rounded-lg p-8 text-center" {
                div class="mx-auto h-12 w-12 rounded-full border-4 border-blue-200 border-t-blue-600 animate-spin" {};
                p class="mt-4 text-gray-600" { "Loading" }
            }
        }
    }
}

fn genre_checkboxes(label: &str, selected: &[GenreId]) -> Markup {
    html! {
        fieldset {
            legend class="block text-sm font-medium text-gray-700" { (label) }
            div class="mt-2 grid grid-cols-2 gap-2 md:grid-cols-5" {
                @for genre in Genre::ALL {
                    label class="inline-flex items-center gap-2 text-sm text-gray-700" {
                        input type="checkbox" name="genres" value=(genre.id()) checked[selected.contains(&genre.id())];
                        (genre.name())
                    }
                }
            }
        }
    }
}

fn text_input(name: &str, label: &str, value: &str, required: bool) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" name=(name) id=(name) value=(value) required[required];
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            h3 class="text-xl font-semibold text-gray-900" { (movie.title) }
            dl class="mt-3 space-y-1 text-sm text-gray-700" {
                div { dt class="inline font-medium" { "Language: " } dd class="inline" { (movie.language) } }
                div { dt class="inline font-medium" { "Region: " } dd class="inline" { (movie.region) } }
                div { dt class="inline font-medium" { "Release Year: " } dd class="inline" { (movie.release_year) } }
                div { dt class="inline font-medium" { "Rating: " } dd class="inline" { (movie.rating) } }
                div { dt class="inline font-medium" { "Platform: " } dd class="inline" { (movie.platform.as_deref().unwrap_or("N/A")) } }
            }
        }
    }
}
