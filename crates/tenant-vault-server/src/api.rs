pub mod health;
pub mod secrets;
pub mod users;
