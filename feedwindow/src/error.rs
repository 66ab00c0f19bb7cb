/// A geometry read failed, typically because the row was unmounted mid-measurement.
///
/// The engine keeps the previous (cached or estimated) height and retries the next time the
/// row is materialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("row geometry unavailable")]
pub struct GeometryUnavailable;
