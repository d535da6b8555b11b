//! Size limit constants for input validation

/// Maximum length for a JWT token string (64KB)
pub const MAX_TOKEN_LENGTH: usize = 64 * 1024;

/// Maximum nesting of JSON arrays/objects accepted by the parser
///
/// The parser recurses once per level, so this bounds stack usage.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Lifetime given to tokens whose payload carries no numeric `exp` (25 minutes)
pub const DEFAULT_TTL_SECONDS: i64 = 1500;
