pub mod transaction_dto;
pub mod transaction_handlers;
pub mod transaction_models;
pub mod transaction_repository;
pub mod transaction_service;
