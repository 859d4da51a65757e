//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (gateways, cache, queue, event bus, password encoder) are
//! implemented in `outbound`. The driving [`Interactor`] port is consumed by
//! `inbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod auxiliary;
mod gateway;
mod gateway_factory;
mod interactor;

#[cfg(test)]
pub use auxiliary::{MockEventBus, MockPasswordEncoder, MockTaskQueue, MockUserCache};
pub use auxiliary::{EventBus, PasswordEncoder, TaskQueue, UserCache};
#[cfg(test)]
pub use gateway::{
    MockCheckUserIdExistence, MockCommit, MockGetMovieById, MockGetUserById,
    MockGetUserByUsername, MockGetUserMovieRating, MockRemoveUserMovieRating,
    MockSaveAddingTask, MockSaveMovie, MockSaveUser, MockSaveUserMovieRating, MockUpdateMovie,
    MockUpdateUser, MockUpdateUserMovieRating,
};
pub use gateway::{
    CheckUserIdExistence, Commit, DatabaseGateway, GatewayError, GetMovieById, GetUserById,
    GetUserByUsername, GetUserMovieRating, RemoveUserMovieRating, SaveAddingTask, SaveMovie,
    SaveUser, SaveUserMovieRating, UpdateMovie, UpdateUser, UpdateUserMovieRating,
};
pub use gateway_factory::GatewayFactory;
#[cfg(test)]
pub use interactor::MockInteractor;
pub use interactor::Interactor;
