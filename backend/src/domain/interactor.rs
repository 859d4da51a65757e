//! Handler-backed implementation of the [`Interactor`] port.
//!
//! Each call asks the factory for fresh gateways, builds the matching handler
//! and runs it inside [`log_unexpected`]. No business rules live here.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::commands::{
    ConfirmUserCommand, ConfirmUserError, ConfirmUserHandler, CreateAddingTaskCommand,
    CreateAddingTaskError, CreateAddingTaskHandler, CreateMovieCommand, CreateMovieHandler,
    MovieRatingSummary, RateMovieCommand, RateMovieError, RateMovieHandler,
    ReevaluateMovieCommand, ReevaluateMovieError, ReevaluateMovieHandler, ReevaluatedRating,
    RegisterCommand, RegisterError, RegisterHandler, RemoveUserMovieRatingCommand,
    RemoveUserMovieRatingError, RemoveUserMovieRatingHandler,
};
use super::handler::{Handler, HandlerResult, log_unexpected};
use super::ports::{GatewayFactory, Interactor, PasswordEncoder};
use super::queries::{
    CheckUsernameExistenceHandler, CheckUsernameExistenceQuery, CurrentUser, GetCurrentUserError,
    GetCurrentUserHandler, GetCurrentUserQuery, GetMovieError, GetMovieHandler, GetMovieQuery,
    LoginError, LoginHandler, LoginQuery, MovieDetails,
};
use super::{AddingTaskId, MovieId, UserId};

/// Dispatches use cases to freshly wired handlers.
pub struct HandlerInteractor<F> {
    factory: F,
    password_encoder: Arc<dyn PasswordEncoder>,
    clock: Arc<dyn Clock>,
}

impl<F> HandlerInteractor<F> {
    pub fn new(
        factory: F,
        password_encoder: Arc<dyn PasswordEncoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            factory,
            password_encoder,
            clock,
        }
    }
}

#[async_trait]
impl<F> Interactor for HandlerInteractor<F>
where
    F: GatewayFactory,
{
    async fn register(&self, command: RegisterCommand) -> HandlerResult<UserId, RegisterError> {
        let handler = RegisterHandler::new(
            self.factory.database(),
            Arc::clone(&self.password_encoder),
            Arc::clone(&self.clock),
        );
        log_unexpected("register", handler.handle(command)).await
    }

    async fn confirm_user(
        &self,
        command: ConfirmUserCommand,
    ) -> HandlerResult<(), ConfirmUserError> {
        let handler = ConfirmUserHandler::new(
            self.factory.database(),
            self.factory.cache(),
            self.factory.task_queue(),
            Arc::clone(&self.clock),
        );
        log_unexpected("confirm_user", handler.handle(command)).await
    }

    async fn create_movie(
        &self,
        command: CreateMovieCommand,
    ) -> HandlerResult<MovieId, Infallible> {
        let handler = CreateMovieHandler::new(self.factory.database(), Arc::clone(&self.clock));
        log_unexpected("create_movie", handler.handle(command)).await
    }

    async fn rate_movie(
        &self,
        command: RateMovieCommand,
    ) -> HandlerResult<MovieRatingSummary, RateMovieError> {
        let handler = RateMovieHandler::new(self.factory.database(), Arc::clone(&self.clock));
        log_unexpected("rate_movie", handler.handle(command)).await
    }

    async fn reevaluate_movie(
        &self,
        command: ReevaluateMovieCommand,
    ) -> HandlerResult<ReevaluatedRating, ReevaluateMovieError> {
        let handler =
            ReevaluateMovieHandler::new(self.factory.database(), Arc::clone(&self.clock));
        log_unexpected("reevaluate_movie", handler.handle(command)).await
    }

    async fn remove_user_movie_rating(
        &self,
        command: RemoveUserMovieRatingCommand,
    ) -> HandlerResult<MovieRatingSummary, RemoveUserMovieRatingError> {
        let handler = RemoveUserMovieRatingHandler::new(self.factory.database());
        log_unexpected("remove_user_movie_rating", handler.handle(command)).await
    }

    async fn create_adding_task(
        &self,
        command: CreateAddingTaskCommand,
    ) -> HandlerResult<AddingTaskId, CreateAddingTaskError> {
        let handler = CreateAddingTaskHandler::new(
            self.factory.database(),
            self.factory.event_bus(),
            Arc::clone(&self.clock),
        );
        log_unexpected("create_adding_task", handler.handle(command)).await
    }

    async fn login(&self, query: LoginQuery) -> HandlerResult<UserId, LoginError> {
        let handler =
            LoginHandler::new(self.factory.database(), Arc::clone(&self.password_encoder));
        log_unexpected("login", handler.handle(query)).await
    }

    async fn check_username_existence(
        &self,
        query: CheckUsernameExistenceQuery,
    ) -> HandlerResult<bool, Infallible> {
        let handler = CheckUsernameExistenceHandler::new(self.factory.database());
        log_unexpected("check_username_existence", handler.handle(query)).await
    }

    async fn get_current_user(
        &self,
        query: GetCurrentUserQuery,
    ) -> HandlerResult<CurrentUser, GetCurrentUserError> {
        let handler = GetCurrentUserHandler::new(self.factory.database(), self.factory.cache());
        log_unexpected("get_current_user", handler.handle(query)).await
    }

    async fn get_movie(&self, query: GetMovieQuery) -> HandlerResult<MovieDetails, GetMovieError> {
        let handler = GetMovieHandler::new(self.factory.database());
        log_unexpected("get_movie", handler.handle(query)).await
    }
}

#[cfg(test)]
mod tests {
    //! End-to-end use case flows through the facade.
    use super::*;
    use crate::domain::handler::HandlerError;
    use crate::domain::test_support::{RecordingFactory, fixture_clock, password_encoder, rating};
    use crate::domain::{MovieTitle, Password, Username};
    use rstest::{fixture, rstest};

    #[fixture]
    fn factory() -> RecordingFactory {
        RecordingFactory::default()
    }

    fn interactor(factory: &RecordingFactory) -> HandlerInteractor<RecordingFactory> {
        HandlerInteractor::new(factory.clone(), password_encoder(), fixture_clock())
    }

    fn register_command(username: &str) -> RegisterCommand {
        RegisterCommand {
            username: Username::new(username).expect("valid username"),
            password: Password::new("pw").expect("valid password"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn register_then_login_then_confirm(factory: RecordingFactory) {
        let interactor = interactor(&factory);
        let user_id = interactor
            .register(register_command("alice"))
            .await
            .expect("registered");

        let logged_in = interactor
            .login(LoginQuery {
                username: Username::new("alice").expect("valid username"),
                password: Password::new("pw").expect("valid password"),
            })
            .await
            .expect("login");
        assert_eq!(logged_in, user_id);

        interactor
            .confirm_user(ConfirmUserCommand { user_id })
            .await
            .expect("confirmed");
        let current = interactor
            .get_current_user(GetCurrentUserQuery { user_id })
            .await
            .expect("current user");
        assert!(current.is_confirmed);
        assert_eq!(factory.queue.delivered(), vec![user_id]);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_registration_keeps_store_unchanged(factory: RecordingFactory) {
        let interactor = interactor(&factory);
        interactor
            .register(register_command("alice"))
            .await
            .expect("first registration");

        let err = interactor
            .register(register_command("alice"))
            .await
            .expect_err("duplicate");

        assert!(matches!(
            err,
            HandlerError::Rejected(RegisterError::UsernameAlreadyExists { .. })
        ));
        assert_eq!(factory.gateway.user_count(), 1);
        let exists = interactor
            .check_username_existence(CheckUsernameExistenceQuery {
                username: Username::new("alice").expect("valid username"),
            })
            .await
            .expect("existence query");
        assert!(exists);
    }

    #[rstest]
    #[tokio::test]
    async fn rating_lifecycle_keeps_aggregate_consistent(factory: RecordingFactory) {
        let interactor = interactor(&factory);
        let user_id = interactor
            .register(register_command("alice"))
            .await
            .expect("registered");
        let movie_id = interactor
            .create_movie(CreateMovieCommand {
                title: MovieTitle::new("Stalker").expect("valid title"),
            })
            .await
            .expect("movie created");

        interactor
            .rate_movie(RateMovieCommand {
                user_id,
                movie_id,
                rating: rating(4),
            })
            .await
            .expect("rated");
        let reevaluated = interactor
            .reevaluate_movie(ReevaluateMovieCommand {
                user_id,
                movie_id,
                rating: rating(10),
            })
            .await
            .expect("reevaluated");
        assert_eq!(reevaluated.movie.rating_count, 1);

        let details = interactor
            .get_movie(GetMovieQuery { movie_id })
            .await
            .expect("movie");
        assert!((details.average_rating - 10.0).abs() < f64::EPSILON);

        let removed = interactor
            .remove_user_movie_rating(RemoveUserMovieRatingCommand { user_id, movie_id })
            .await
            .expect("removed");
        assert_eq!(removed.rating_count, 0);
        assert!(removed.average_rating.abs() < f64::EPSILON);
    }
}
