pub mod compute;
pub mod health;
