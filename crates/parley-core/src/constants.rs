//! Fixed strings and tuning knobs shared across crates.

/// System instruction prepended to every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Provide clear, concise, and accurate responses. \
If you don't know something, say so rather than making up information.";

/// User-facing response substituted when the pipeline fails.
pub const FALLBACK_RESPONSE: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// How many prior history entries are carried into the prompt.
pub const CONTEXT_WINDOW: usize = 5;

/// Response cache capacity. Once full, the cache freezes: no eviction,
/// no further inserts.
pub const CACHE_CAPACITY: usize = 10;

/// Session id used when a chat request names none.
pub const DEFAULT_SESSION: &str = "default";
