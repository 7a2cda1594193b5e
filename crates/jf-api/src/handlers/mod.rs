pub mod feed;
pub mod health;
pub mod listings;
pub mod swipes;
