use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the blind clock backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::clock_stream,
        crate::routes::sse::controller_stream,
        crate::routes::sse::display_stream,
        crate::routes::clock::get_clock,
        crate::routes::clock::start_clock,
        crate::routes::clock::pause_clock,
        crate::routes::clock::next_level,
        crate::routes::clock::previous_level,
        crate::routes::clock::seek_clock,
        crate::routes::clock::set_sound,
        crate::routes::clock::reload_sound,
        crate::routes::schedule::install_schedule,
        crate::routes::schedule::get_schedule,
        crate::routes::schedule::get_next_break,
        crate::routes::recovery::recovery_report,
        crate::routes::recovery::recover_clock,
        crate::routes::recovery::backup_snapshot,
        crate::routes::recovery::restore_backup,
        crate::routes::recovery::clear_snapshots,
        crate::routes::display::open_display,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::clock::ClockSnapshot,
            crate::dto::clock::VisibleClockPhase,
            crate::dto::clock::ClockRoleDto,
            crate::dto::clock::SeekRequest,
            crate::dto::clock::SoundRequest,
            crate::dto::clock::ActionResponse,
            crate::dto::schedule::InstallScheduleRequest,
            crate::dto::schedule::BlindLevelInput,
            crate::dto::schedule::BlindLevelDto,
            crate::dto::schedule::ScheduleSummary,
            crate::dto::schedule::BreakInfoResponse,
            crate::dto::recovery::RecoveryReport,
            crate::dto::recovery::SnapshotInfo,
            crate::dto::recovery::RestoreResponse,
            crate::dto::display::OpenDisplayRequest,
            crate::dto::display::DisplayUrlResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::ControllerHandshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::TickEvent,
            crate::dto::sse::LevelChangedEvent,
            crate::dto::sse::AlertEvent,
            crate::dto::sse::AlertFlashEvent,
            crate::dto::sse::RoleChangedEvent,
            crate::dto::sse::SoundChangedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "clock", description = "Tournament clock controls"),
        (name = "schedule", description = "Blind structure management"),
        (name = "recovery", description = "Snapshot persistence and recovery"),
        (name = "display", description = "Spectator display management"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
