//! Recording doubles shared by handler and interactor tests.
//!
//! Every double stages writes and applies them on `commit`, so tests observe
//! the same two-step durability boundary production adapters provide. Reads
//! only see committed state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    CheckUserIdExistence, Commit, EventBus, GatewayError, GatewayFactory, GetMovieById,
    GetUserById, GetUserByUsername, GetUserMovieRating, PasswordEncoder, RemoveUserMovieRating,
    SaveAddingTask, SaveMovie, SaveUser, SaveUserMovieRating, TaskQueue, UpdateMovie, UpdateUser,
    UpdateUserMovieRating, UserCache,
};
use crate::domain::{
    AddingTask, AddingTaskCreatedEvent, AddingTaskId, Movie, MovieId, MovieTitle, PasswordHash,
    RatingValue, User, UserId, UserMovieRating, Username,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

/// Reversible encoder so tests can assert on stored hashes.
pub(crate) struct PlainPasswordEncoder;

impl PasswordEncoder for PlainPasswordEncoder {
    fn encode(&self, password: &str) -> Result<PasswordHash, GatewayError> {
        Ok(PasswordHash::new(format!("plain${password}")))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        hash.as_ref() == format!("plain${password}")
    }
}

pub(crate) fn password_encoder() -> Arc<dyn PasswordEncoder> {
    Arc::new(PlainPasswordEncoder)
}

pub(crate) fn user(name: &str) -> User {
    User::create(
        UserId::random(),
        Username::new(name).expect("valid username"),
        PlainPasswordEncoder.encode("pw").expect("plain encoding"),
        fixture_timestamp(),
    )
}

pub(crate) fn confirmed_user(name: &str) -> User {
    let mut user = user(name);
    user.confirm(fixture_timestamp()).expect("fresh user confirms");
    user
}

pub(crate) fn movie(title: &str) -> Movie {
    Movie::create(
        MovieId::random(),
        MovieTitle::new(title).expect("valid title"),
        fixture_timestamp(),
    )
}

pub(crate) fn rating(value: u8) -> RatingValue {
    RatingValue::new(value).expect("rating in range")
}

/// Stores `value` for `user` on `movie`, keeping the movie aggregate in step.
pub(crate) fn rated(user: &User, movie: &mut Movie, value: u8) -> UserMovieRating {
    movie.add_rating(rating(value));
    UserMovieRating::create(*user.id(), *movie.id(), rating(value), fixture_timestamp())
}

#[derive(Debug, Clone)]
enum StagedWrite {
    User(User),
    Movie(Movie),
    Rating(UserMovieRating),
    RemoveRating(UserId, MovieId),
    Task(AddingTask),
}

#[derive(Debug, Default)]
struct GatewayState {
    users: HashMap<UserId, User>,
    movies: HashMap<MovieId, Movie>,
    ratings: HashMap<(UserId, MovieId), UserMovieRating>,
    tasks: HashMap<AddingTaskId, AddingTask>,
    staged: Vec<StagedWrite>,
    writes: usize,
    commits: usize,
    commit_failure: Option<GatewayError>,
}

/// Gateway double implementing every persistence capability.
///
/// Clones share state, so a test can keep one handle while the handler owns
/// another.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl RecordingGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GatewayState> {
        self.state.lock().expect("gateway state lock")
    }

    pub(crate) fn with_user(self, user: User) -> Self {
        self.lock().users.insert(*user.id(), user);
        self
    }

    pub(crate) fn with_movie(self, movie: Movie) -> Self {
        self.lock().movies.insert(*movie.id(), movie);
        self
    }

    pub(crate) fn with_rating(self, rating: UserMovieRating) -> Self {
        self.lock()
            .ratings
            .insert((*rating.user_id(), *rating.movie_id()), rating);
        self
    }

    pub(crate) fn failing_commit(self, error: GatewayError) -> Self {
        self.lock().commit_failure = Some(error);
        self
    }

    /// Number of staged write calls.
    pub(crate) fn writes(&self) -> usize {
        self.lock().writes
    }

    pub(crate) fn commits(&self) -> usize {
        self.lock().commits
    }

    pub(crate) fn user(&self, id: &UserId) -> Option<User> {
        self.lock().users.get(id).cloned()
    }

    pub(crate) fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub(crate) fn movie(&self, id: &MovieId) -> Option<Movie> {
        self.lock().movies.get(id).cloned()
    }

    pub(crate) fn rating(&self, user_id: &UserId, movie_id: &MovieId) -> Option<UserMovieRating> {
        self.lock().ratings.get(&(*user_id, *movie_id)).cloned()
    }

    pub(crate) fn task(&self, id: &AddingTaskId) -> Option<AddingTask> {
        self.lock().tasks.get(id).cloned()
    }

    fn stage(&self, write: StagedWrite) {
        let mut state = self.lock();
        state.writes += 1;
        state.staged.push(write);
    }
}

#[async_trait]
impl CheckUserIdExistence for RecordingGateway {
    async fn check_user_id_existence(&self, user_id: &UserId) -> Result<bool, GatewayError> {
        Ok(self.lock().users.contains_key(user_id))
    }
}

#[async_trait]
impl GetUserById for RecordingGateway {
    async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
        Ok(self.user(user_id))
    }
}

#[async_trait]
impl GetUserByUsername for RecordingGateway {
    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, GatewayError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }
}

#[async_trait]
impl SaveUser for RecordingGateway {
    async fn save_user(&self, user: &User) -> Result<(), GatewayError> {
        self.stage(StagedWrite::User(user.clone()));
        Ok(())
    }
}

#[async_trait]
impl UpdateUser for RecordingGateway {
    async fn update_user(&self, user: &User) -> Result<(), GatewayError> {
        self.stage(StagedWrite::User(user.clone()));
        Ok(())
    }
}

#[async_trait]
impl GetMovieById for RecordingGateway {
    async fn get_movie_by_id(&self, movie_id: &MovieId) -> Result<Option<Movie>, GatewayError> {
        Ok(self.movie(movie_id))
    }
}

#[async_trait]
impl SaveMovie for RecordingGateway {
    async fn save_movie(&self, movie: &Movie) -> Result<(), GatewayError> {
        self.stage(StagedWrite::Movie(movie.clone()));
        Ok(())
    }
}

#[async_trait]
impl UpdateMovie for RecordingGateway {
    async fn update_movie(&self, movie: &Movie) -> Result<(), GatewayError> {
        self.stage(StagedWrite::Movie(movie.clone()));
        Ok(())
    }
}

#[async_trait]
impl GetUserMovieRating for RecordingGateway {
    async fn get_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<Option<UserMovieRating>, GatewayError> {
        Ok(self.rating(user_id, movie_id))
    }
}

#[async_trait]
impl SaveUserMovieRating for RecordingGateway {
    async fn save_user_movie_rating(&self, rating: &UserMovieRating) -> Result<(), GatewayError> {
        self.stage(StagedWrite::Rating(rating.clone()));
        Ok(())
    }
}

#[async_trait]
impl UpdateUserMovieRating for RecordingGateway {
    async fn update_user_movie_rating(
        &self,
        rating: &UserMovieRating,
    ) -> Result<(), GatewayError> {
        self.stage(StagedWrite::Rating(rating.clone()));
        Ok(())
    }
}

#[async_trait]
impl RemoveUserMovieRating for RecordingGateway {
    async fn remove_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<(), GatewayError> {
        self.stage(StagedWrite::RemoveRating(*user_id, *movie_id));
        Ok(())
    }
}

#[async_trait]
impl SaveAddingTask for RecordingGateway {
    async fn save_adding_task(&self, task: &AddingTask) -> Result<(), GatewayError> {
        self.stage(StagedWrite::Task(task.clone()));
        Ok(())
    }
}

#[async_trait]
impl Commit for RecordingGateway {
    async fn commit(&self) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.commits += 1;
        if let Some(error) = state.commit_failure.clone() {
            state.staged.clear();
            return Err(error);
        }
        for write in std::mem::take(&mut state.staged) {
            match write {
                StagedWrite::User(user) => {
                    state.users.insert(*user.id(), user);
                }
                StagedWrite::Movie(movie) => {
                    state.movies.insert(*movie.id(), movie);
                }
                StagedWrite::Rating(rating) => {
                    state
                        .ratings
                        .insert((*rating.user_id(), *rating.movie_id()), rating);
                }
                StagedWrite::RemoveRating(user_id, movie_id) => {
                    state.ratings.remove(&(user_id, movie_id));
                }
                StagedWrite::Task(task) => {
                    state.tasks.insert(*task.id(), task);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CacheState {
    users: HashMap<UserId, User>,
    staged: Vec<(User, bool)>,
    reads: usize,
    commits: usize,
    commit_failure: Option<GatewayError>,
}

/// User cache double.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingCache {
    state: Arc<Mutex<CacheState>>,
}

impl RecordingCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().expect("cache state lock")
    }

    pub(crate) fn with_user(self, user: User) -> Self {
        self.lock().users.insert(*user.id(), user);
        self
    }

    pub(crate) fn failing_commit(self, error: GatewayError) -> Self {
        self.lock().commit_failure = Some(error);
        self
    }

    pub(crate) fn cached(&self, id: &UserId) -> Option<User> {
        self.lock().users.get(id).cloned()
    }

    pub(crate) fn reads(&self) -> usize {
        self.lock().reads
    }

    pub(crate) fn commits(&self) -> usize {
        self.lock().commits
    }
}

#[async_trait]
impl UserCache for RecordingCache {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
        let mut state = self.lock();
        state.reads += 1;
        Ok(state.users.get(user_id).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<(), GatewayError> {
        self.lock().staged.push((user.clone(), true));
        Ok(())
    }

    async fn fill_user(&self, user: &User) -> Result<(), GatewayError> {
        self.lock().staged.push((user.clone(), false));
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.commits += 1;
        if let Some(error) = state.commit_failure.clone() {
            state.staged.clear();
            return Err(error);
        }
        for (user, replace) in std::mem::take(&mut state.staged) {
            if replace {
                state.users.insert(*user.id(), user);
            } else {
                state.users.entry(*user.id()).or_insert(user);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct QueueState {
    staged: Vec<UserId>,
    delivered: Vec<UserId>,
    commit_failure: Option<GatewayError>,
}

/// Task queue double.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingQueue {
    state: Arc<Mutex<QueueState>>,
}

impl RecordingQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().expect("queue state lock")
    }

    pub(crate) fn failing_commit(self, error: GatewayError) -> Self {
        self.lock().commit_failure = Some(error);
        self
    }

    /// Greeting emails that made it past `commit`.
    pub(crate) fn delivered(&self) -> Vec<UserId> {
        self.lock().delivered.clone()
    }
}

#[async_trait]
impl TaskQueue for RecordingQueue {
    async fn enqueue_send_greeting_email(&self, user_id: &UserId) -> Result<(), GatewayError> {
        self.lock().staged.push(*user_id);
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if let Some(error) = state.commit_failure.clone() {
            state.staged.clear();
            return Err(error);
        }
        let staged = std::mem::take(&mut state.staged);
        state.delivered.extend(staged);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct EventState {
    staged: Vec<AddingTaskCreatedEvent>,
    published: Vec<AddingTaskCreatedEvent>,
    commit_failure: Option<GatewayError>,
}

/// Event bus double.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingEventBus {
    state: Arc<Mutex<EventState>>,
}

impl RecordingEventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EventState> {
        self.state.lock().expect("event state lock")
    }

    pub(crate) fn failing_commit(self, error: GatewayError) -> Self {
        self.lock().commit_failure = Some(error);
        self
    }

    pub(crate) fn published(&self) -> Vec<AddingTaskCreatedEvent> {
        self.lock().published.clone()
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish_adding_task_created(
        &self,
        event: &AddingTaskCreatedEvent,
    ) -> Result<(), GatewayError> {
        self.lock().staged.push(event.clone());
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if let Some(error) = state.commit_failure.clone() {
            state.staged.clear();
            return Err(error);
        }
        let staged = std::mem::take(&mut state.staged);
        state.published.extend(staged);
        Ok(())
    }
}

/// Factory handing out clones of shared recording doubles.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingFactory {
    pub(crate) gateway: RecordingGateway,
    pub(crate) cache: RecordingCache,
    pub(crate) queue: RecordingQueue,
    pub(crate) events: RecordingEventBus,
}

impl GatewayFactory for RecordingFactory {
    type Database = RecordingGateway;
    type Cache = RecordingCache;
    type Queue = RecordingQueue;
    type Events = RecordingEventBus;

    fn database(&self) -> Self::Database {
        self.gateway.clone()
    }

    fn cache(&self) -> Self::Cache {
        self.cache.clone()
    }

    fn task_queue(&self) -> Self::Queue {
        self.queue.clone()
    }

    fn event_bus(&self) -> Self::Events {
        self.events.clone()
    }
}
