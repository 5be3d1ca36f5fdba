pub mod access_service;
pub mod auth;
pub mod business_service;
pub mod manual_service;
pub mod quiz_service;
pub mod role_service;
