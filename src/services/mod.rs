/// Read-only board-game catalog queries.
pub mod boardgame_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Dual-store session coordination.
pub mod session_service;
/// Store connection supervision with backoff and degraded mode.
pub mod storage_supervisor;
