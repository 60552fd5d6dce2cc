pub mod channels;
pub mod device_handlers;
pub mod device_models;
pub mod device_repository;
pub mod push_service;
pub mod worker;
