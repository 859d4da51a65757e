//! Behaviour tests for the chat bot WebSocket transport.
//!
//! Scenarios mix bot and REST calls against one server to show both
//! adapters share storage.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// Each suite uses a different slice of the shared world.
#[allow(dead_code)]
#[path = "cinerate_support/harness.rs"]
mod harness;
#[allow(dead_code)]
#[path = "cinerate_support/http.rs"]
mod http;

use actix_web::http::{Method, header};
use awc::Client;
use awc::ws::{Frame, Message};
use futures_util::{SinkExt as _, StreamExt as _};
use harness::{BotSocket, SharedWorld, WorldFixture};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use uuid::Uuid;

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

async fn exchange(mut socket: BotSocket, text: String) -> (BotSocket, Value) {
    let frame = json!({ "traceId": Uuid::new_v4(), "text": text }).to_string();
    socket
        .send(Message::Text(frame.into()))
        .await
        .expect("send bot message");
    loop {
        match socket.next().await.expect("bot frame").expect("frame") {
            Frame::Text(bytes) => {
                let reply = serde_json::from_slice(&bytes).expect("bot reply json");
                return (socket, reply);
            }
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

fn send_to_bot(world: &SharedWorld, text: String) {
    let socket = world.borrow_mut().bot.take().expect("open bot connection");
    let (socket, reply) = harness::with_world_async(world, |_| exchange(socket, text));

    let mut ctx = world.borrow_mut();
    ctx.last_reply = reply.get("reply").and_then(Value::as_str).map(str::to_owned);
    ctx.bot = Some(socket);
}

fn last_reply(world: &SharedWorld) -> String {
    world.borrow().last_reply.clone().expect("bot reply")
}

#[given("a running cinerate server")]
fn a_running_cinerate_server(world: &WorldFixture) {
    let _ = world;
}

#[given("a registered user {username} with password {password}")]
fn a_registered_user(world: &WorldFixture, username: String, password: String) {
    let world = world.world();
    http::register(&world, &username, &password);
    http::assert_status(&world, 201);
}

#[given("a movie titled {title} added over HTTP by {username}")]
fn a_movie_added_over_http(world: &WorldFixture, title: String, username: String) {
    let world = world.world();
    http::login(&world, &username, "secret");
    http::assert_status(&world, 200);
    http::authorised(
        &world,
        Method::POST,
        "/api/v1/movies",
        Some(json!({ "title": title })),
    );
    http::assert_status(&world, 201);
    let movie_id = world
        .borrow()
        .last_body
        .as_ref()
        .and_then(|body| body.get("movieId"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .expect("movieId");
    world.borrow_mut().movie_id = Some(movie_id);
}

#[given("an open bot connection")]
fn an_open_bot_connection(world: &WorldFixture) {
    let world = world.world();
    let socket = harness::with_world_async(&world, |base_url| async move {
        let (_response, socket) = Client::default()
            .ws(format!("{base_url}/ws/bot"))
            .set_header(header::ORIGIN, "http://localhost:3000")
            .connect()
            .await
            .expect("websocket connect");
        socket
    });
    world.borrow_mut().bot = Some(socket);
}

#[when("the bot receives a rating of {rating} for the movie")]
fn the_bot_receives_a_rating(world: &WorldFixture, rating: u8) {
    let world = world.world();
    let movie_id = world.borrow().movie_id.clone().expect("movie created");
    send_to_bot(&world, format!("/rate {movie_id} {rating}"));
}

#[when("the bot receives the message {text}")]
fn the_bot_receives(world: &WorldFixture, text: String) {
    send_to_bot(&world.world(), text);
}

#[then("the bot replies {reply}")]
fn the_bot_replies(world: &WorldFixture, reply: String) {
    assert_eq!(last_reply(&world.world()), reply);
}

#[then("the bot reply starts with {prefix}")]
fn the_bot_reply_starts_with(world: &WorldFixture, prefix: String) {
    let reply = last_reply(&world.world());
    assert!(reply.starts_with(&prefix), "unexpected reply: {reply}");
}

#[then("the REST catalogue shows average {average} from {count} ratings")]
fn the_rest_catalogue_shows_average(world: &WorldFixture, average: f64, count: u64) {
    let world = world.world();
    let movie_id = world.borrow().movie_id.clone().expect("movie created");
    http::authorised(
        &world,
        Method::GET,
        &format!("/api/v1/movies/{movie_id}"),
        None,
    );
    http::assert_status(&world, 200);

    let ctx = world.borrow();
    let body = ctx.last_body.as_ref().expect("movie body");
    let actual = body
        .get("averageRating")
        .and_then(Value::as_f64)
        .expect("averageRating");
    assert!((actual - average).abs() < 1e-9, "average was {actual}");
    assert_eq!(body.get("ratingCount").and_then(Value::as_u64), Some(count));
}

#[then("one import event was published")]
fn one_import_event_was_published(world: &WorldFixture) {
    assert_eq!(world.world().borrow().store.adding_task_events().len(), 1);
}

#[scenario(
    path = "tests/features/bot_chat.feature",
    name = "Chat ratings show up in the REST catalogue"
)]
fn chat_ratings_show_up_in_rest(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/bot_chat.feature",
    name = "Personal commands need a login"
)]
fn personal_commands_need_login(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/bot_chat.feature",
    name = "Import requests from chat are published"
)]
fn chat_import_requests_are_published(world: WorldFixture) {
    drop(world);
}
