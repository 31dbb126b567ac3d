// Stage services: role targeting, resume screening, coding assessment and the
// AI interview. Each consumes AI results and records outcomes as pipeline commands.

pub mod coding;
pub mod handlers;
pub mod interview;
pub mod resume;
pub mod roles;
