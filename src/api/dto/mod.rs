//! Response DTOs for the REST surface.

pub mod session_dto;

pub use session_dto::{SessionListResponse, StatsResponse};
