//! PostgreSQL implementation of every gateway capability.
//!
//! Reads check out a pooled connection and run immediately. Writes are
//! staged in memory and replayed inside one transaction on
//! [`Commit::commit`], so an instance dropped before committing leaves the
//! database untouched.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{
    CheckUserIdExistence, Commit, GatewayError, GetMovieById, GetUserById, GetUserByUsername,
    GetUserMovieRating, RemoveUserMovieRating, SaveAddingTask, SaveMovie, SaveUser,
    SaveUserMovieRating, UpdateMovie, UpdateUser, UpdateUserMovieRating,
};
use crate::domain::{AddingTask, Movie, MovieId, User, UserId, UserMovieRating, Username};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{MovieRecord, NewAddingTaskRecord, UserMovieRatingRecord, UserRecord};
use super::pool::DbPool;
use super::schema::{adding_tasks, movies, user_movie_ratings, users};

#[derive(Debug)]
enum PendingWrite {
    InsertUser(UserRecord),
    UpdateUser(UserRecord),
    InsertMovie(MovieRecord),
    UpdateMovie(MovieRecord),
    InsertRating(UserMovieRatingRecord),
    UpdateRating(UserMovieRatingRecord),
    DeleteRating { user_id: uuid::Uuid, movie_id: uuid::Uuid },
    InsertTask(NewAddingTaskRecord),
}

/// Per-request unit of work over the shared pool.
pub struct DieselGateway {
    pool: DbPool,
    pending: Mutex<Vec<PendingWrite>>,
}

impl DieselGateway {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Vec<PendingWrite>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stage(&self, write: PendingWrite) {
        self.pending().push(write);
    }
}

fn ensure_affected(rows: usize) -> QueryResult<()> {
    if rows == 0 {
        return Err(diesel::result::Error::NotFound);
    }
    Ok(())
}

async fn apply(conn: &mut AsyncPgConnection, write: &PendingWrite) -> QueryResult<()> {
    match write {
        PendingWrite::InsertUser(row) => {
            diesel::insert_into(users::table)
                .values(row)
                .execute(conn)
                .await?;
        }
        PendingWrite::UpdateUser(row) => {
            let rows = diesel::update(users::table.find(row.id))
                .set(row)
                .execute(conn)
                .await?;
            ensure_affected(rows)?;
        }
        PendingWrite::InsertMovie(row) => {
            diesel::insert_into(movies::table)
                .values(row)
                .execute(conn)
                .await?;
        }
        PendingWrite::UpdateMovie(row) => {
            let rows = diesel::update(movies::table.find(row.id))
                .set(row)
                .execute(conn)
                .await?;
            ensure_affected(rows)?;
        }
        PendingWrite::InsertRating(row) => {
            diesel::insert_into(user_movie_ratings::table)
                .values(row)
                .execute(conn)
                .await?;
        }
        PendingWrite::UpdateRating(row) => {
            let rows = diesel::update(user_movie_ratings::table.find((row.user_id, row.movie_id)))
                .set(row)
                .execute(conn)
                .await?;
            ensure_affected(rows)?;
        }
        PendingWrite::DeleteRating { user_id, movie_id } => {
            let rows = diesel::delete(user_movie_ratings::table.find((*user_id, *movie_id)))
                .execute(conn)
                .await?;
            ensure_affected(rows)?;
        }
        PendingWrite::InsertTask(row) => {
            diesel::insert_into(adding_tasks::table)
                .values(row)
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl CheckUserIdExistence for DieselGateway {
    async fn check_user_id_existence(&self, user_id: &UserId) -> Result<bool, GatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(users::table.find(*user_id.as_uuid())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl GetUserById for DieselGateway {
    async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRecord> = users::table
            .find(*user_id.as_uuid())
            .select(UserRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl GetUserByUsername for DieselGateway {
    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, GatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRecord> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl SaveUser for DieselGateway {
    async fn save_user(&self, user: &User) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertUser(UserRecord::from(user)));
        Ok(())
    }
}

#[async_trait]
impl UpdateUser for DieselGateway {
    async fn update_user(&self, user: &User) -> Result<(), GatewayError> {
        self.stage(PendingWrite::UpdateUser(UserRecord::from(user)));
        Ok(())
    }
}

#[async_trait]
impl GetMovieById for DieselGateway {
    async fn get_movie_by_id(&self, movie_id: &MovieId) -> Result<Option<Movie>, GatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MovieRecord> = movies::table
            .find(*movie_id.as_uuid())
            .select(MovieRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Movie::try_from).transpose()
    }
}

#[async_trait]
impl SaveMovie for DieselGateway {
    async fn save_movie(&self, movie: &Movie) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertMovie(MovieRecord::try_from(movie)?));
        Ok(())
    }
}

#[async_trait]
impl UpdateMovie for DieselGateway {
    async fn update_movie(&self, movie: &Movie) -> Result<(), GatewayError> {
        self.stage(PendingWrite::UpdateMovie(MovieRecord::try_from(movie)?));
        Ok(())
    }
}

#[async_trait]
impl GetUserMovieRating for DieselGateway {
    async fn get_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<Option<UserMovieRating>, GatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserMovieRatingRecord> = user_movie_ratings::table
            .find((*user_id.as_uuid(), *movie_id.as_uuid()))
            .select(UserMovieRatingRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserMovieRating::try_from).transpose()
    }
}

#[async_trait]
impl SaveUserMovieRating for DieselGateway {
    async fn save_user_movie_rating(&self, rating: &UserMovieRating) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertRating(UserMovieRatingRecord::from(rating)));
        Ok(())
    }
}

#[async_trait]
impl UpdateUserMovieRating for DieselGateway {
    async fn update_user_movie_rating(
        &self,
        rating: &UserMovieRating,
    ) -> Result<(), GatewayError> {
        self.stage(PendingWrite::UpdateRating(UserMovieRatingRecord::from(rating)));
        Ok(())
    }
}

#[async_trait]
impl RemoveUserMovieRating for DieselGateway {
    async fn remove_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<(), GatewayError> {
        self.stage(PendingWrite::DeleteRating {
            user_id: *user_id.as_uuid(),
            movie_id: *movie_id.as_uuid(),
        });
        Ok(())
    }
}

#[async_trait]
impl SaveAddingTask for DieselGateway {
    async fn save_adding_task(&self, task: &AddingTask) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertTask(NewAddingTaskRecord::from(task)));
        Ok(())
    }
}

#[async_trait]
impl Commit for DieselGateway {
    async fn commit(&self) -> Result<(), GatewayError> {
        let pending = std::mem::take(&mut *self.pending());
        if pending.is_empty() {
            return Ok(());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                for write in &pending {
                    apply(conn, write).await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
