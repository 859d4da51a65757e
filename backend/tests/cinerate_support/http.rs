//! JSON request helpers shared by the HTTP scenarios.

use actix_web::http::{Method, header};
use awc::Client;
use serde_json::{Value, json};

use cinerate::domain::TRACE_ID_HEADER;

use crate::harness::SharedWorld;

pub(crate) struct JsonRequest<'a> {
    pub(crate) include_cookie: bool,
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) payload: Option<Value>,
}

pub(crate) fn credentials(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

fn cookie_pair(world: &SharedWorld) -> Option<String> {
    world
        .borrow()
        .session_cookie
        .as_deref()
        .and_then(|raw| raw.split(';').next())
        .map(str::to_owned)
}

/// Send a request and record its status, trace header and JSON body.
///
/// Empty bodies are recorded as `null`.
pub(crate) fn perform_json_request(world: &SharedWorld, request: JsonRequest<'_>) {
    let JsonRequest {
        include_cookie,
        method,
        path,
        payload,
    } = request;
    let cookie = if include_cookie { cookie_pair(world) } else { None };
    let (status, trace_id, set_cookie, body) = with_request(world, method, path, cookie, payload);

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_trace_id = trace_id;
    ctx.last_body = Some(body);
    if set_cookie.is_some() {
        ctx.session_cookie = set_cookie;
    }
}

fn with_request(
    world: &SharedWorld,
    method: Method,
    path: &str,
    cookie: Option<String>,
    payload: Option<Value>,
) -> (u16, Option<String>, Option<String>, Value) {
    let path = path.to_owned();
    crate::harness::with_world_async(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await.expect("request sent"),
            None => request.send().await.expect("request sent"),
        };
        let header_value = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        let status = response.status().as_u16();
        let trace_id = header_value(TRACE_ID_HEADER);
        let set_cookie = header_value(header::SET_COOKIE.as_str());
        let bytes = response.body().await.expect("response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, trace_id, set_cookie, body)
    })
}

pub(crate) fn register(world: &SharedWorld, username: &str, password: &str) {
    perform_json_request(
        world,
        JsonRequest {
            include_cookie: false,
            method: Method::POST,
            path: "/api/v1/users",
            payload: Some(credentials(username, password)),
        },
    );
}

pub(crate) fn login(world: &SharedWorld, username: &str, password: &str) {
    perform_json_request(
        world,
        JsonRequest {
            include_cookie: false,
            method: Method::POST,
            path: "/api/v1/login",
            payload: Some(credentials(username, password)),
        },
    );
}

pub(crate) fn authorised(world: &SharedWorld, method: Method, path: &str, payload: Option<Value>) {
    perform_json_request(
        world,
        JsonRequest {
            include_cookie: true,
            method,
            path,
            payload,
        },
    );
}

pub(crate) fn assert_status(world: &SharedWorld, expected: u16) {
    let ctx = world.borrow();
    assert_eq!(ctx.last_status, Some(expected), "body: {:?}", ctx.last_body);
}

pub(crate) fn assert_error_code(world: &SharedWorld, expected: &str) {
    let ctx = world.borrow();
    let body = ctx.last_body.as_ref().expect("error body");
    assert_eq!(body.get("code").and_then(Value::as_str), Some(expected));
}
