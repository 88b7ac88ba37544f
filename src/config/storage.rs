pub const STARRED_TOKENS_KEY: &str = "STARRED_TOKENS";
pub const STARRED_TREE_NAME: &str = "starred_tokens";
pub const DEFAULT_DB_PATH: &str = ".dexscreener/db";
