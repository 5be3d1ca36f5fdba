pub mod access;
pub mod auth;
pub mod business;
pub mod manual;
pub mod quiz;
