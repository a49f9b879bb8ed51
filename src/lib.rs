pub mod appwrite;
pub mod config;
pub mod error;
pub mod models;
pub mod rank;
pub mod search;
pub mod store;
pub mod tmdb;
pub mod trends;
