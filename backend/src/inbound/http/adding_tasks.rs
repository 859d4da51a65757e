//! Import request handler.
//!
//! ```text
//! POST /api/v1/adding-tasks {"addingType":"movie","kinopoiskId":"326"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::commands::CreateAddingTaskCommand;
use crate::domain::{AddingTaskType, Error, KinopoiskId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::rejections::invalid_field;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddingTaskRequest {
    /// `movie` or `series`.
    #[schema(example = "movie")]
    pub adding_type: String,
    #[schema(example = "326")]
    pub kinopoisk_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddingTaskCreatedResponse {
    #[schema(value_type = String, format = Uuid)]
    pub task_id: String,
}

fn parse_request(
    request: &CreateAddingTaskRequest,
) -> Result<(AddingTaskType, KinopoiskId), Error> {
    let adding_type = request
        .adding_type
        .parse::<AddingTaskType>()
        .map_err(|err| invalid_field("addingType", "unknown_adding_type", err))?;
    let kinopoisk_id = KinopoiskId::new(&request.kinopoisk_id)
        .map_err(|err| invalid_field("kinopoiskId", "invalid_kinopoisk_id", err))?;
    Ok((adding_type, kinopoisk_id))
}

/// Queue a request to import a title from Kinopoisk.
#[utoipa::path(
    post,
    path = "/api/v1/adding-tasks",
    request_body = CreateAddingTaskRequest,
    responses(
        (status = 201, description = "Task queued", body = AddingTaskCreatedResponse),
        (status = 400, description = "Invalid type or identifier", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["adding-tasks"],
    operation_id = "createAddingTask"
)]
#[post("/adding-tasks")]
pub async fn create_adding_task(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateAddingTaskRequest>,
) -> ApiResult<HttpResponse> {
    let creator_id = caller.into_user_id();
    let (adding_type, kinopoisk_id) = parse_request(&payload)?;
    let task_id = state
        .interactor
        .create_adding_task(CreateAddingTaskCommand {
            creator_id,
            adding_type,
            kinopoisk_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(AddingTaskCreatedResponse {
        task_id: task_id.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::inbound::http::test_utils::{memory_state, test_session_middleware};
    use crate::inbound::http::users::{login, register};

    async fn body_json(response: actix_web::dev::ServiceResponse) -> Value {
        let bytes = actix_test::read_body(response).await;
        serde_json::from_slice(&bytes).expect("JSON body")
    }

    macro_rules! tasks_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($state)
                    .wrap(test_session_middleware())
                    .service(
                        web::scope("/api/v1")
                            .service(register)
                            .service(login)
                            .service(create_adding_task),
                    ),
            )
            .await
        };
    }

    macro_rules! logged_in {
        ($app:expr) => {{
            let creds = json!({ "username": "alice", "password": "pw" });
            actix_test::call_service(
                $app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/users")
                    .set_json(&creds)
                    .to_request(),
            )
            .await;
            let response = actix_test::call_service(
                $app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/login")
                    .set_json(&creds)
                    .to_request(),
            )
            .await;
            session_cookie(&response)
        }};
    }

    fn session_cookie(response: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(Cookie::into_owned)
            .expect("session cookie")
    }

    #[rstest]
    #[case("movie", AddingTaskType::Movie)]
    #[case("Series", AddingTaskType::Series)]
    #[actix_web::test]
    async fn queues_task_and_publishes_event(
        #[case] raw_type: &str,
        #[case] expected: AddingTaskType,
    ) {
        let (state, store) = memory_state();
        let app = tasks_app!(state);
        let cookie = logged_in!(&app);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/adding-tasks")
                .cookie(cookie)
                .set_json(json!({ "addingType": raw_type, "kinopoiskId": "326" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let task_id = body_json(response).await["taskId"]
            .as_str()
            .map(str::to_owned)
            .expect("taskId");
        let events = store.adding_task_events();
        assert_eq!(events.len(), 1);
        let event = events.first().expect("event");
        assert_eq!(event.id.to_string(), task_id);
        assert_eq!(event.adding_type, expected);
        assert_eq!(event.kinopoisk_id.as_ref(), "326");
    }

    #[rstest]
    #[case(json!({ "addingType": "cartoon", "kinopoiskId": "326" }), "addingType", "unknown_adding_type")]
    #[case(json!({ "addingType": "movie", "kinopoiskId": "tt0113277" }), "kinopoiskId", "invalid_kinopoisk_id")]
    #[case(json!({ "addingType": "movie", "kinopoiskId": "" }), "kinopoiskId", "invalid_kinopoisk_id")]
    #[actix_web::test]
    async fn rejects_invalid_requests(
        #[case] body: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let (state, store) = memory_state();
        let app = tasks_app!(state);
        let cookie = logged_in!(&app);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/adding-tasks")
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = body_json(response).await;
        assert_eq!(payload["details"]["field"], json!(field));
        assert_eq!(payload["details"]["code"], json!(code));
        assert!(store.adding_task_events().is_empty());
    }

    #[actix_web::test]
    async fn requires_session() {
        let (state, store) = memory_state();
        let app = tasks_app!(state);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/adding-tasks")
                .set_json(json!({ "addingType": "movie", "kinopoiskId": "326" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.adding_task_events().is_empty());
    }
}
