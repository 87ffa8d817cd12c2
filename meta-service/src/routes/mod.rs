pub mod define;
pub mod health;
