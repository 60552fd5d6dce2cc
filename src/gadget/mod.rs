pub mod gadget_dto;
pub mod gadget_handlers;
pub mod gadget_models;
pub mod gadget_repository;
pub mod gadget_service;
pub mod otp_repository;
