pub mod admin;
pub mod assignment;
pub mod attempt;
pub mod auth;
pub mod shared;
pub mod template;
