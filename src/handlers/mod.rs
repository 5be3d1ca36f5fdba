pub mod auth;
pub mod businesses;
pub mod departments;
pub mod manuals;
pub mod quizzes;
pub mod roles;
