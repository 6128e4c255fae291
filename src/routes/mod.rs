/// Router Module Index
///
/// Organizes the gate's routing into modules by the session state each one requires.
/// Access rules are attached per module (extractors and route layers), so a route cannot
/// end up with weaker checks than its siblings.

/// Routes reachable without a session: health, catalog and navigation checks.
pub mod public;

/// Routes that act on the caller's session. Lifecycle routes need a known session id,
/// the rest a complete session (flag, actor, access token).
pub mod session;

/// The dashboard subtree itself, wrapped by the route guard middleware.
pub mod dashboard;
