pub mod favorites;
pub mod health;
pub mod search;
