/// Clock control operations: start, pause, navigation, sound.
pub mod clock_service;
/// Spectator display URL resolution and slot management.
pub mod display_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Snapshot persistence and crash recovery.
pub mod recovery_service;
/// Blind structure installation and queries.
pub mod schedule_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Snapshot store supervision and degraded mode handling.
pub mod storage_supervisor;
/// The 1 Hz interval task advancing the clock.
pub mod ticker;
