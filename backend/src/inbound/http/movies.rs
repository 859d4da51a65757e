//! Movie catalogue and rating handlers.
//!
//! ```text
//! POST   /api/v1/movies {"title":"Heat"}
//! GET    /api/v1/movies/{movie_id}
//! POST   /api/v1/movies/{movie_id}/ratings {"rating":8}
//! PUT    /api/v1/movies/{movie_id}/ratings/me {"rating":6}
//! DELETE /api/v1/movies/{movie_id}/ratings/me
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::commands::{
    CreateMovieCommand, MovieRatingSummary, RateMovieCommand, ReevaluateMovieCommand,
    RemoveUserMovieRatingCommand,
};
use crate::domain::queries::{GetMovieQuery, MovieDetails};
use crate::domain::{
    Error, MovieId, MovieTitle, MovieValidationError, RatingOutOfRange, RatingValue,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::rejections::invalid_field;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

fn parse_movie_id(raw: &str) -> Result<MovieId, Error> {
    MovieId::new(raw).map_err(|err| invalid_field("movieId", "invalid_movie_id", err))
}

fn parse_rating(raw: i64) -> Result<RatingValue, Error> {
    RatingValue::try_from(raw)
        .map_err(|err: RatingOutOfRange| invalid_field("rating", "rating_out_of_range", err))
}

fn map_title_error(err: MovieValidationError) -> Error {
    let code = match err {
        MovieValidationError::EmptyTitle => "empty_title",
        MovieValidationError::TitleTooLong { .. } => "title_too_long",
        MovieValidationError::InvalidId => "invalid_movie_id",
    };
    invalid_field("title", code, err)
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateMovieRequest {
    #[schema(example = "Heat")]
    pub title: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieCreatedResponse {
    #[schema(value_type = String, format = Uuid)]
    pub movie_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    #[schema(example = "Heat")]
    pub title: String,
    #[schema(example = 7.5)]
    pub average_rating: f64,
    #[schema(example = 2)]
    pub rating_count: u64,
}

impl From<MovieDetails> for MovieResponse {
    fn from(movie: MovieDetails) -> Self {
        Self {
            id: movie.id.to_string(),
            title: movie.title.into(),
            average_rating: movie.average_rating,
            rating_count: movie.rating_count,
        }
    }
}

/// Request body for rating endpoints.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct RatingRequest {
    /// Integer on the `0..=10` scale.
    #[schema(minimum = 0, maximum = 10, example = 8)]
    pub rating: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryResponse {
    #[schema(value_type = String, format = Uuid)]
    pub movie_id: String,
    pub average_rating: f64,
    pub rating_count: u64,
    /// Present after re-rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<u8>,
}

impl From<MovieRatingSummary> for RatingSummaryResponse {
    fn from(summary: MovieRatingSummary) -> Self {
        Self {
            movie_id: summary.movie_id.to_string(),
            average_rating: summary.average_rating,
            rating_count: summary.rating_count,
            user_rating: None,
        }
    }
}

/// Add a movie to the catalogue.
#[utoipa::path(
    post,
    path = "/api/v1/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = MovieCreatedResponse),
        (status = 400, description = "Invalid title", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["movies"],
    operation_id = "createMovie"
)]
#[post("/movies")]
pub async fn create_movie(
    state: web::Data<HttpState>,
    _caller: Caller,
    payload: web::Json<CreateMovieRequest>,
) -> ApiResult<HttpResponse> {
    let title = MovieTitle::new(&payload.title).map_err(map_title_error)?;
    let movie_id = state
        .interactor
        .create_movie(CreateMovieCommand { title })
        .await?;
    Ok(HttpResponse::Created().json(MovieCreatedResponse {
        movie_id: movie_id.to_string(),
    }))
}

/// Fetch a movie with its rating aggregate.
#[utoipa::path(
    get,
    path = "/api/v1/movies/{movie_id}",
    params(("movie_id" = String, Path, description = "Movie identifier")),
    responses(
        (status = 200, description = "Movie", body = MovieResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Movie not found", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["movies"],
    operation_id = "getMovie",
    security([])
)]
#[get("/movies/{movie_id}")]
pub async fn get_movie(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MovieResponse>> {
    let movie_id = parse_movie_id(&path)?;
    let movie = state
        .interactor
        .get_movie(GetMovieQuery { movie_id })
        .await?;
    Ok(web::Json(movie.into()))
}

/// Rate a movie for the first time.
#[utoipa::path(
    post,
    path = "/api/v1/movies/{movie_id}/ratings",
    params(("movie_id" = String, Path, description = "Movie identifier")),
    request_body = RatingRequest,
    responses(
        (status = 201, description = "Rating recorded", body = RatingSummaryResponse),
        (status = 400, description = "Rating out of range", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User or movie not found", body = ErrorSchema),
        (status = 409, description = "Already rated", body = ErrorSchema)
    ),
    tags = ["ratings"],
    operation_id = "rateMovie"
)]
#[post("/movies/{movie_id}/ratings")]
pub async fn rate_movie(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<RatingRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = caller.into_user_id();
    let movie_id = parse_movie_id(&path)?;
    let rating = parse_rating(payload.rating)?;
    let summary = state
        .interactor
        .rate_movie(RateMovieCommand {
            user_id,
            movie_id,
            rating,
        })
        .await?;
    Ok(HttpResponse::Created().json(RatingSummaryResponse::from(summary)))
}

/// Replace the caller's rating. The rating count stays the same.
#[utoipa::path(
    put,
    path = "/api/v1/movies/{movie_id}/ratings/me",
    params(("movie_id" = String, Path, description = "Movie identifier")),
    request_body = RatingRequest,
    responses(
        (status = 200, description = "Rating replaced", body = RatingSummaryResponse),
        (status = 400, description = "Rating out of range", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User, movie or rating not found", body = ErrorSchema)
    ),
    tags = ["ratings"],
    operation_id = "reevaluateMovie"
)]
#[put("/movies/{movie_id}/ratings/me")]
pub async fn reevaluate_movie(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<RatingRequest>,
) -> ApiResult<web::Json<RatingSummaryResponse>> {
    let user_id = caller.into_user_id();
    let movie_id = parse_movie_id(&path)?;
    let rating = parse_rating(payload.rating)?;
    let reevaluated = state
        .interactor
        .reevaluate_movie(ReevaluateMovieCommand {
            user_id,
            movie_id,
            rating,
        })
        .await?;
    let mut response = RatingSummaryResponse::from(reevaluated.movie);
    response.user_rating = Some(reevaluated.user_rating.get());
    Ok(web::Json(response))
}

/// Withdraw the caller's rating.
#[utoipa::path(
    delete,
    path = "/api/v1/movies/{movie_id}/ratings/me",
    params(("movie_id" = String, Path, description = "Movie identifier")),
    responses(
        (status = 200, description = "Rating removed", body = RatingSummaryResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User, movie or rating not found", body = ErrorSchema)
    ),
    tags = ["ratings"],
    operation_id = "removeMovieRating"
)]
#[delete("/movies/{movie_id}/ratings/me")]
pub async fn remove_movie_rating(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<RatingSummaryResponse>> {
    let user_id = caller.into_user_id();
    let movie_id = parse_movie_id(&path)?;
    let summary = state
        .interactor
        .remove_user_movie_rating(RemoveUserMovieRatingCommand { user_id, movie_id })
        .await?;
    Ok(web::Json(summary.into()))
}

#[cfg(test)]
#[path = "movies_tests.rs"]
mod tests;
