pub mod auth_service;
pub mod match_service;
pub mod pairing_service;
pub mod token_service;
