//! Lua scripts for Redis operations that must be atomic.
//!
//! Redis runs a script as a single unit, so concurrent failed logins cannot
//! interleave between the increment and the expiry.

/// Lua script for increment-with-expiry.
///
/// Arguments:
/// - KEYS[1]: Counter key (e.g., `user:login-attempts:{username}`)
/// - ARGV[1]: Expiry in milliseconds, applied when the key is created
///
/// Returns:
/// - The counter value after the increment
///
/// The `PTTL == -1` branch repairs a counter that somehow exists without an
/// expiry (written by an older non-atomic client), so it cannot lock an
/// account forever.
pub const INCREMENT_WITH_EXPIRY: &str = r#"
local count = redis.call('INCR', KEYS[1])

if count == 1 or redis.call('PTTL', KEYS[1]) == -1 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
end

return count
"#;
