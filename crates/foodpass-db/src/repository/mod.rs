//! # Repository Layer
//!
//! One repository per aggregate, each a thin cloneable handle over the
//! shared pool. The worker, consumption and user repositories also
//! implement the engine's store traits, so a `Database` can be plugged
//! straight into a `RegistrationEngine`.

pub mod consumption;
pub mod dining_hall;
pub mod user;
pub mod worker;

pub use consumption::ConsumptionRepository;
pub use dining_hall::DiningHallRepository;
pub use user::UserRepository;
pub use worker::WorkerRepository;
