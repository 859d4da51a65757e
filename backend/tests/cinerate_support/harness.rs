//! Server harness and shared world for end-to-end scenarios.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs on the in-memory
//! store so scenarios can inspect published events directly. `WorldFixture`
//! stops the server even if a step panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_codec::Framed;
use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use awc::BoxedSocket;
use awc::ws::Codec;
use mockable::DefaultClock;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use cinerate::Trace;
use cinerate::domain::HandlerInteractor;
use cinerate::domain::ports::Interactor;
use cinerate::inbound::http::adding_tasks::create_adding_task;
use cinerate::inbound::http::error::{json_config, query_config};
use cinerate::inbound::http::movies::{
    create_movie, get_movie, rate_movie, reevaluate_movie, remove_movie_rating,
};
use cinerate::inbound::http::state::HttpState;
use cinerate::inbound::http::users::{
    confirm_user, current_user, login, register, username_exists,
};
use cinerate::inbound::ws;
use cinerate::inbound::ws::state::WsState;
use cinerate::outbound::memory::{InMemoryGatewayFactory, InMemoryStore};
use cinerate::outbound::password::Argon2PasswordEncoder;

pub(crate) type BotSocket = Framed<BoxedSocket, Codec>;

pub(crate) struct CinerateWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) store: InMemoryStore,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
    pub(crate) session_cookie: Option<String>,
    pub(crate) movie_id: Option<String>,
    pub(crate) bot: Option<BotSocket>,
    pub(crate) last_reply: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<CinerateWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

fn shutdown(world: SharedWorld) {
    drop(world.borrow_mut().bot.take());
    // The future must not borrow the world; `block_on` runs under its lock.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

async fn spawn_server(interactor: Arc<dyn Interactor>) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let http_data = web::Data::new(HttpState::new(Arc::clone(&interactor)));
    let ws_data = web::Data::new(WsState::new(interactor));

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .wrap(session_middleware(key.clone()))
            .service(username_exists)
            .service(current_user)
            .service(confirm_user)
            .service(register)
            .service(login)
            .service(create_movie)
            .service(get_movie)
            .service(rate_movie)
            .service(reevaluate_movie)
            .service(remove_movie_rating)
            .service(create_adding_task);

        App::new()
            .app_data(http_data.clone())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(ws_data.clone())
            .wrap(Trace)
            .service(api)
            .service(ws::bot_entry)
    })
    .disable_signals()
    .shutdown_timeout(1)
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    (runtime, LocalSet::new())
}

pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    let store = InMemoryStore::new();
    let interactor: Arc<dyn Interactor> = Arc::new(HandlerInteractor::new(
        InMemoryGatewayFactory::new(store.clone()),
        Arc::new(Argon2PasswordEncoder::with_cost(8, 1, 1).expect("minimal argon2 cost")),
        Arc::new(DefaultClock),
    ));
    let (base_url, server) = local
        .block_on(&runtime, spawn_server(interactor))
        .expect("server should start");

    WorldFixture {
        world: Rc::new(RefCell::new(CinerateWorld {
            runtime,
            local,
            base_url,
            server,
            store,
            last_status: None,
            last_body: None,
            last_trace_id: None,
            session_cookie: None,
            movie_id: None,
            bot: None,
            last_reply: None,
        })),
    }
}

