/// Path segments of the persons collection, relative to the service base url.
/// A single person lives one segment further down, at its id.
pub const PERSONS_SEGMENTS: [&str; 2] = ["api", "persons"];
