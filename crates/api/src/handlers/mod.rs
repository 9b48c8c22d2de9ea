pub mod admin;
pub mod auth;
pub mod restaurant;
pub mod waitlist;
