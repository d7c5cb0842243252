pub mod dto;
pub mod ordering;
pub mod task_service;
