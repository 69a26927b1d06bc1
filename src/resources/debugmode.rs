//! Debug toggle resource.
//!
//! The mere presence of this resource enables the debug overlay. Remove it
//! to stop queuing debug draws; the buffer is still flushed every frame.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, the overlay system queues debug draws.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct DebugMode {}
