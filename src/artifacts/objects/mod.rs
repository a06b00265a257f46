pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tag;
pub mod tree;

/// Hex width of a SHA-256 object id. The hash width is a parameter of the
/// storage format; everything downstream goes through this constant.
pub const OBJECT_ID_LENGTH: usize = 64;

/// Shortest hash prefix accepted when resolving abbreviated ids.
pub const MIN_ABBREV_LENGTH: usize = 4;
