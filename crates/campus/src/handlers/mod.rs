pub mod addresses;
pub mod attendance;
mod authz;
pub mod disciplinary_actions;
pub mod error;
pub mod health;
pub mod health_safety;
pub mod register;
mod response;
pub mod student_behaviors;
pub mod terms;
pub mod users;

pub use error::AppError;
