pub mod assignment;
pub mod attempt;
pub mod template;
pub mod user;
