use std::io::{BufRead, Write};

use crate::{
    catalog::{
        CatalogService, DEFAULT_LIST_LIMIT, DEFAULT_MIN_RATING, DEFAULT_RECOMMENDATION_LIMIT,
    },
    models::{Genre, GenreId, Movie, NewMovie, SearchCriteria},
    store::MovieStore,
};

/// Line-mode front end. Returns when the user picks "Exit" or input ends;
/// store failures end the loop with an error.
pub async fn run<S, R, W>(
    catalog: &CatalogService<S>,
    mut input: R,
    mut out: W,
) -> anyhow::Result<()>
where
    S: MovieStore,
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(out, "\n--- Movie Recommendation System ---")?;
        writeln!(out, "1. Movie Recommendations")?;
        writeln!(out, "2. View All Movies")?;
        writeln!(out, "3. Search Movies")?;
        writeln!(out, "4. Add Movie")?;
        writeln!(out, "5. Exit")?;

        let Some(choice) = prompt(&mut input, &mut out, "Enter your choice: ")? else {
            break;
        };

        let keep_going = match choice.as_str() {
            "1" => recommendations(catalog, &mut input, &mut out).await?,
            "2" => {
                writeln!(out, "\n--- All Movies ---")?;
                let movies = catalog.list_all_movies(DEFAULT_LIST_LIMIT).await?;
                print_movies(&mut out, &movies, "No movies available.")?;
                true
            },
            "3" => search(catalog, &mut input, &mut out).await?,
            "4" => add(catalog, &mut input, &mut out).await?,
            "5" => false,
            _ => {
                writeln!(out, "Invalid choice. Please try again.")?;
                true
            },
        };

        if !keep_going {
            break;
        }
    }

    writeln!(out, "Exiting...")?;
    Ok(())
}

async fn recommendations<S: MovieStore>(
    catalog: &CatalogService<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    writeln!(out, "\n--- Get Recommendations ---")?;
    writeln!(out, "Available Genres (IDs): {}", genre_legend())?;

    let Some(raw) = prompt(input, out, "Enter your favorite genre IDs (comma-separated): ")? else {
        return Ok(false);
    };
    let genres = parse_genre_ids(&raw);

    let Some(raw) = prompt(input, out, "Minimum rating (0-10, default 7): ")? else {
        return Ok(false);
    };
    let min_rating = if raw.is_empty() {
        DEFAULT_MIN_RATING
    } else {
        match raw.parse::<f64>() {
            Ok(r) => r,
            Err(_) => {
                writeln!(out, "Invalid rating: {raw}")?;
                return Ok(true);
            },
        }
    };

    let movies =
        catalog.get_recommendations(&genres, min_rating, DEFAULT_RECOMMENDATION_LIMIT).await?;
    if !movies.is_empty() {
        writeln!(out, "\nTop Recommendations:")?;
    }
    print_movies(out, &movies, "No recommendations found.")?;
    Ok(true)
}

async fn search<S: MovieStore>(
    catalog: &CatalogService<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    writeln!(out, "\n--- Search Movies ---")?;

    let Some(genres) = prompt(input, out, "Genre IDs (comma-separated, leave blank for all): ")?
    else {
        return Ok(false);
    };
    let Some(language) = prompt(input, out, "Language (leave blank for any): ")? else {
        return Ok(false);
    };
    let Some(region) = prompt(input, out, "Region (leave blank for any): ")? else {
        return Ok(false);
    };
    let Some(platform) = prompt(input, out, "Platform (leave blank for any): ")? else {
        return Ok(false);
    };

    let criteria = SearchCriteria {
        genres: parse_genre_ids(&genres),
        language: Some(language),
        region: Some(region),
        platform: Some(platform),
    };

    let movies = catalog.search_movies(&criteria).await?;
    if !movies.is_empty() {
        writeln!(out, "\nSearch Results:")?;
    }
    print_movies(out, &movies, "No movies found matching your criteria.")?;
    Ok(true)
}

async fn add<S: MovieStore>(
    catalog: &CatalogService<S>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    writeln!(out, "\n--- Add Movie ---")?;

    let mut answers = Vec::with_capacity(7);
    for question in [
        "Title: ",
        "Language: ",
        "Region: ",
        "Release year: ",
        "Rating (0-10): ",
        "Platform (optional): ",
        "Genre IDs (comma-separated, optional): ",
    ] {
        match prompt(input, out, question)? {
            Some(answer) => answers.push(answer),
            None => return Ok(false),
        }
    }

    let [title, language, region, year, rating, platform, genres] = &answers[..] else {
        return Ok(true);
    };

    if title.is_empty() {
        writeln!(out, "Title is required.")?;
        return Ok(true);
    }
    let Ok(release_year) = year.parse::<i32>() else {
        writeln!(out, "Invalid release year: {year}")?;
        return Ok(true);
    };
    let Ok(rating) = rating.parse::<f64>() else {
        writeln!(out, "Invalid rating: {rating}")?;
        return Ok(true);
    };

    let new = NewMovie {
        title: title.clone(),
        language: language.clone(),
        region: region.clone(),
        release_year,
        rating,
        platform: Some(platform.clone()),
        genre_ids: parse_genre_ids(genres),
    };

    match catalog.add_movie(new).await {
        Ok(movie) => writeln!(out, "Added: {}", movie_line(&movie))?,
        Err(err) if err.is_rejection() => writeln!(out, "Error: {err}")?,
        Err(err) => return Err(err.into()),
    }
    Ok(true)
}

fn prompt(
    input: &mut impl BufRead,
    out: &mut impl Write,
    question: &str,
) -> anyhow::Result<Option<String>> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Comma separated ids; anything that isn't a number is skipped.
fn parse_genre_ids(raw: &str) -> Vec<GenreId> {
    raw.split(',').filter_map(|part| part.trim().parse().ok()).collect()
}

fn genre_legend() -> String {
    Genre::ALL.iter().map(|g| format!("{}. {}", g.id(), g.name())).collect::<Vec<_>>().join(", ")
}

fn movie_line(m: &Movie) -> String {
    format!(
        "{} | {} | {} | {} | Rating: {} | Platform: {}",
        m.title,
        m.language,
        m.region,
        m.release_year,
        m.rating,
        m.platform.as_deref().unwrap_or("N/A")
    )
}

fn print_movies(out: &mut impl Write, movies: &[Movie], empty: &str) -> std::io::Result<()> {
    if movies.is_empty() {
        return writeln!(out, "{empty}");
    }
    for m in movies {
        writeln!(out, "{}", movie_line(m))?;
    }
    Ok(())
}
