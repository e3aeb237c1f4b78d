//! Shared constants for the markup crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height a box may have after any resize, in page units.
pub const MIN_BOX_SIZE: f64 = 20.0;

/// Default perpendicular distance, in page units, for connector hit-testing.
pub const HIT_THRESHOLD: f64 = 5.0;

/// Bezier control points sit `distance / CONTROL_POINT_DIVISOR` in from each endpoint.
pub const CONTROL_POINT_DIVISOR: f64 = 3.0;

// ── Export ──────────────────────────────────────────────────────

/// Page width stamped on exported boxes and export metadata.
pub const DEFAULT_PAGE_WIDTH: u32 = 800;

/// Page height stamped on exported boxes and export metadata.
pub const DEFAULT_PAGE_HEIGHT: u32 = 1131;

// ── Layers ──────────────────────────────────────────────────────

/// Id of the reserved layer that always exists and cannot be removed.
pub const DEFAULT_LAYER_ID: &str = "default";

/// Display name of the reserved layer.
pub const DEFAULT_LAYER_NAME: &str = "Default";

/// Colors handed out to new layers, in order, before falling back to random.
pub const LAYER_PALETTE: [&str; 10] = [
    "#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316", "#6366F1", "#84CC16",
];

// ── Connections ─────────────────────────────────────────────────

/// Stroke color for connections created without an explicit style.
pub const DEFAULT_CONNECTION_COLOR: &str = "#333333";

/// Stroke width for connections created without an explicit style.
pub const DEFAULT_CONNECTION_WIDTH: f64 = 2.0;
