//! Process-local adapters used when no database is configured.
//!
//! [`InMemoryStore`] holds committed state behind a mutex. Gateways created
//! by [`InMemoryGatewayFactory`] stage writes privately and apply them to the
//! store atomically on commit, mirroring the PostgreSQL adapter. Uniqueness
//! rules enforced by the schema (usernames, one rating per pair) are enforced
//! here at commit time too.
//!
//! Cached users expire after the store's TTL. The greeting-email and event
//! mailboxes keep at most [`MAILBOX_CAPACITY`] entries each and drop the
//! oldest when full.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::warn;

use crate::outbound::cache::{CacheWrite, DEFAULT_USER_TTL};

use crate::domain::ports::{
    CheckUserIdExistence, Commit, EventBus, GatewayError, GatewayFactory, GetMovieById,
    GetUserById, GetUserByUsername, GetUserMovieRating, RemoveUserMovieRating, SaveAddingTask,
    SaveMovie, SaveUser, SaveUserMovieRating, TaskQueue, UpdateMovie, UpdateUser,
    UpdateUserMovieRating, UserCache,
};
use crate::domain::{
    AddingTask, AddingTaskCreatedEvent, AddingTaskId, Movie, MovieId, User, UserId,
    UserMovieRating, Username,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Entries retained per mailbox before the oldest are dropped.
pub const MAILBOX_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    movies: HashMap<MovieId, Movie>,
    ratings: HashMap<(UserId, MovieId), UserMovieRating>,
    tasks: HashMap<AddingTaskId, AddingTask>,
}

#[derive(Debug, Default)]
struct Mailboxes {
    cached_users: HashMap<UserId, CachedUser>,
    greeting_emails: VecDeque<UserId>,
    adding_task_events: VecDeque<AddingTaskCreatedEvent>,
}

#[derive(Debug)]
struct CachedUser {
    user: User,
    expires_at: Instant,
}

fn push_bounded<T>(mailbox: &mut VecDeque<T>, items: Vec<T>, name: &'static str) {
    for item in items {
        if mailbox.len() == MAILBOX_CAPACITY {
            mailbox.pop_front();
            warn!(mailbox = name, capacity = MAILBOX_CAPACITY, "mailbox full; dropping oldest");
        }
        mailbox.push_back(item);
    }
}

/// Shared committed state.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    mailboxes: Arc<Mutex<Mailboxes>>,
    user_cache_ttl: Duration,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            tables: Arc::default(),
            mailboxes: Arc::default(),
            user_cache_ttl: DEFAULT_USER_TTL,
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user_cache_ttl(mut self, ttl: Duration) -> Self {
        self.user_cache_ttl = ttl;
        self
    }

    pub fn user_count(&self) -> usize {
        lock(&self.tables).users.len()
    }

    /// Users with a committed greeting email, in enqueue order.
    pub fn greeting_emails(&self) -> Vec<UserId> {
        lock(&self.mailboxes).greeting_emails.iter().copied().collect()
    }

    /// Remove and return every pending greeting email.
    pub fn drain_greeting_emails(&self) -> Vec<UserId> {
        lock(&self.mailboxes).greeting_emails.drain(..).collect()
    }

    pub fn adding_task_events(&self) -> Vec<AddingTaskCreatedEvent> {
        lock(&self.mailboxes).adding_task_events.iter().cloned().collect()
    }

    /// Remove and return every published adding-task event.
    pub fn drain_adding_task_events(&self) -> Vec<AddingTaskCreatedEvent> {
        lock(&self.mailboxes).adding_task_events.drain(..).collect()
    }
}

#[derive(Debug, Clone)]
enum PendingWrite {
    InsertUser(User),
    UpdateUser(User),
    InsertMovie(Movie),
    UpdateMovie(Movie),
    InsertRating(UserMovieRating),
    UpdateRating(UserMovieRating),
    DeleteRating(UserId, MovieId),
    InsertTask(AddingTask),
}

fn duplicate(what: &str) -> GatewayError {
    GatewayError::query(format!("duplicate {what}"))
}

fn missing(what: &str) -> GatewayError {
    GatewayError::query(format!("{what} not found"))
}

/// Prior value of one entry touched by an applied write.
enum Undo {
    User(UserId, Option<User>),
    Movie(MovieId, Option<Movie>),
    Rating((UserId, MovieId), Option<UserMovieRating>),
    Task(AddingTaskId, Option<AddingTask>),
}

fn restore<K, V>(table: &mut HashMap<K, V>, key: K, previous: Option<V>)
where
    K: std::hash::Hash + Eq,
{
    match previous {
        Some(value) => table.insert(key, value),
        None => table.remove(&key),
    };
}

impl Tables {
    fn apply(&mut self, write: PendingWrite) -> Result<Undo, GatewayError> {
        let undo = match write {
            PendingWrite::InsertUser(user) => {
                let taken = self.users.contains_key(user.id())
                    || self.users.values().any(|u| u.username() == user.username());
                if taken {
                    return Err(duplicate("user"));
                }
                let id = *user.id();
                Undo::User(id, self.users.insert(id, user))
            }
            PendingWrite::UpdateUser(user) => {
                if !self.users.contains_key(user.id()) {
                    return Err(missing("user"));
                }
                let id = *user.id();
                Undo::User(id, self.users.insert(id, user))
            }
            PendingWrite::InsertMovie(movie) => {
                if self.movies.contains_key(movie.id()) {
                    return Err(duplicate("movie"));
                }
                let id = *movie.id();
                Undo::Movie(id, self.movies.insert(id, movie))
            }
            PendingWrite::UpdateMovie(movie) => {
                if !self.movies.contains_key(movie.id()) {
                    return Err(missing("movie"));
                }
                let id = *movie.id();
                Undo::Movie(id, self.movies.insert(id, movie))
            }
            PendingWrite::InsertRating(rating) => {
                let key = (*rating.user_id(), *rating.movie_id());
                if self.ratings.contains_key(&key) {
                    return Err(duplicate("rating"));
                }
                Undo::Rating(key, self.ratings.insert(key, rating))
            }
            PendingWrite::UpdateRating(rating) => {
                let key = (*rating.user_id(), *rating.movie_id());
                if !self.ratings.contains_key(&key) {
                    return Err(missing("rating"));
                }
                Undo::Rating(key, self.ratings.insert(key, rating))
            }
            PendingWrite::DeleteRating(user_id, movie_id) => {
                let key = (user_id, movie_id);
                let Some(previous) = self.ratings.remove(&key) else {
                    return Err(missing("rating"));
                };
                Undo::Rating(key, Some(previous))
            }
            PendingWrite::InsertTask(task) => {
                if !self.users.contains_key(task.creator_id()) {
                    return Err(missing("task creator"));
                }
                let id = *task.id();
                Undo::Task(id, self.tasks.insert(id, task))
            }
        };
        Ok(undo)
    }

    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::User(id, previous) => restore(&mut self.users, id, previous),
            Undo::Movie(id, previous) => restore(&mut self.movies, id, previous),
            Undo::Rating(key, previous) => restore(&mut self.ratings, key, previous),
            Undo::Task(id, previous) => restore(&mut self.tasks, id, previous),
        }
    }

    /// Apply every write or none of them.
    fn apply_all(&mut self, writes: Vec<PendingWrite>) -> Result<(), GatewayError> {
        let mut applied = Vec::with_capacity(writes.len());
        for write in writes {
            match self.apply(write) {
                Ok(undo) => applied.push(undo),
                Err(error) => {
                    for undo in applied.into_iter().rev() {
                        self.revert(undo);
                    }
                    return Err(error);
                }
            }
        }
        Ok(())
    }
}

/// Per-request gateway over an [`InMemoryStore`].
pub struct InMemoryGateway {
    store: InMemoryStore,
    pending: Mutex<Vec<PendingWrite>>,
}

impl InMemoryGateway {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn stage(&self, write: PendingWrite) {
        lock(&self.pending).push(write);
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        lock(&self.store.tables)
    }
}

#[async_trait]
impl CheckUserIdExistence for InMemoryGateway {
    async fn check_user_id_existence(&self, user_id: &UserId) -> Result<bool, GatewayError> {
        Ok(self.tables().users.contains_key(user_id))
    }
}

#[async_trait]
impl GetUserById for InMemoryGateway {
    async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
        Ok(self.tables().users.get(user_id).cloned())
    }
}

#[async_trait]
impl GetUserByUsername for InMemoryGateway {
    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, GatewayError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }
}

#[async_trait]
impl SaveUser for InMemoryGateway {
    async fn save_user(&self, user: &User) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertUser(user.clone()));
        Ok(())
    }
}

#[async_trait]
impl UpdateUser for InMemoryGateway {
    async fn update_user(&self, user: &User) -> Result<(), GatewayError> {
        self.stage(PendingWrite::UpdateUser(user.clone()));
        Ok(())
    }
}

#[async_trait]
impl GetMovieById for InMemoryGateway {
    async fn get_movie_by_id(&self, movie_id: &MovieId) -> Result<Option<Movie>, GatewayError> {
        Ok(self.tables().movies.get(movie_id).cloned())
    }
}

#[async_trait]
impl SaveMovie for InMemoryGateway {
    async fn save_movie(&self, movie: &Movie) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertMovie(movie.clone()));
        Ok(())
    }
}

#[async_trait]
impl UpdateMovie for InMemoryGateway {
    async fn update_movie(&self, movie: &Movie) -> Result<(), GatewayError> {
        self.stage(PendingWrite::UpdateMovie(movie.clone()));
        Ok(())
    }
}

#[async_trait]
impl GetUserMovieRating for InMemoryGateway {
    async fn get_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<Option<UserMovieRating>, GatewayError> {
        Ok(self.tables().ratings.get(&(*user_id, *movie_id)).cloned())
    }
}

#[async_trait]
impl SaveUserMovieRating for InMemoryGateway {
    async fn save_user_movie_rating(&self, rating: &UserMovieRating) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertRating(rating.clone()));
        Ok(())
    }
}

#[async_trait]
impl UpdateUserMovieRating for InMemoryGateway {
    async fn update_user_movie_rating(
        &self,
        rating: &UserMovieRating,
    ) -> Result<(), GatewayError> {
        self.stage(PendingWrite::UpdateRating(rating.clone()));
        Ok(())
    }
}

#[async_trait]
impl RemoveUserMovieRating for InMemoryGateway {
    async fn remove_user_movie_rating(
        &self,
        user_id: &UserId,
        movie_id: &MovieId,
    ) -> Result<(), GatewayError> {
        self.stage(PendingWrite::DeleteRating(*user_id, *movie_id));
        Ok(())
    }
}

#[async_trait]
impl SaveAddingTask for InMemoryGateway {
    async fn save_adding_task(&self, task: &AddingTask) -> Result<(), GatewayError> {
        self.stage(PendingWrite::InsertTask(task.clone()));
        Ok(())
    }
}

#[async_trait]
impl Commit for InMemoryGateway {
    async fn commit(&self) -> Result<(), GatewayError> {
        let pending = std::mem::take(&mut *lock(&self.pending));
        self.tables().apply_all(pending)
    }
}

/// [`UserCache`] over the store's mailbox.
pub struct InMemoryUserCache {
    store: InMemoryStore,
    pending: Mutex<Vec<CacheWrite>>,
}

impl InMemoryUserCache {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            pending: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserCache for InMemoryUserCache {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, GatewayError> {
        let now = Instant::now();
        let mut mailboxes = lock(&self.store.mailboxes);
        match mailboxes.cached_users.get(user_id) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.user.clone())),
            Some(_) => {
                mailboxes.cached_users.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn update_user(&self, user: &User) -> Result<(), GatewayError> {
        lock(&self.pending).push(CacheWrite::Replace(user.clone()));
        Ok(())
    }

    async fn fill_user(&self, user: &User) -> Result<(), GatewayError> {
        lock(&self.pending).push(CacheWrite::FillIfAbsent(user.clone()));
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        let pending = std::mem::take(&mut *lock(&self.pending));
        if pending.is_empty() {
            return Ok(());
        }
        let now = Instant::now();
        let expires_at = now + self.store.user_cache_ttl;
        let mut mailboxes = lock(&self.store.mailboxes);
        mailboxes.cached_users.retain(|_, entry| entry.expires_at > now);
        for write in pending {
            let (user, replace) = match write {
                CacheWrite::Replace(user) => (user, true),
                CacheWrite::FillIfAbsent(user) => (user, false),
            };
            if !replace && mailboxes.cached_users.contains_key(user.id()) {
                continue;
            }
            mailboxes
                .cached_users
                .insert(*user.id(), CachedUser { user, expires_at });
        }
        Ok(())
    }
}

pub struct InMemoryTaskQueue {
    store: InMemoryStore,
    pending: Mutex<Vec<UserId>>,
}

impl InMemoryTaskQueue {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            pending: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue_send_greeting_email(&self, user_id: &UserId) -> Result<(), GatewayError> {
        lock(&self.pending).push(*user_id);
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        let pending = std::mem::take(&mut *lock(&self.pending));
        let mut mailboxes = lock(&self.store.mailboxes);
        push_bounded(&mut mailboxes.greeting_emails, pending, "greeting_emails");
        Ok(())
    }
}

pub struct InMemoryEventBus {
    store: InMemoryStore,
    pending: Mutex<Vec<AddingTaskCreatedEvent>>,
}

impl InMemoryEventBus {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            pending: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish_adding_task_created(
        &self,
        event: &AddingTaskCreatedEvent,
    ) -> Result<(), GatewayError> {
        lock(&self.pending).push(event.clone());
        Ok(())
    }

    async fn commit(&self) -> Result<(), GatewayError> {
        let pending = std::mem::take(&mut *lock(&self.pending));
        let mut mailboxes = lock(&self.store.mailboxes);
        push_bounded(&mut mailboxes.adding_task_events, pending, "adding_task_events");
        Ok(())
    }
}

/// Hands out in-memory adapters over one shared store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGatewayFactory {
    store: InMemoryStore,
}

impl InMemoryGatewayFactory {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }
}

impl GatewayFactory for InMemoryGatewayFactory {
    type Database = InMemoryGateway;
    type Cache = InMemoryUserCache;
    type Queue = InMemoryTaskQueue;
    type Events = InMemoryEventBus;

    fn database(&self) -> Self::Database {
        InMemoryGateway::new(self.store.clone())
    }

    fn cache(&self) -> Self::Cache {
        InMemoryUserCache::new(self.store.clone())
    }

    fn task_queue(&self) -> Self::Queue {
        InMemoryTaskQueue::new(self.store.clone())
    }

    fn event_bus(&self) -> Self::Events {
        InMemoryEventBus::new(self.store.clone())
    }
}
