pub const DEXSCREENER_URL: &str = "https://api.dexscreener.com/latest";
pub const SEARCH_PATH: &str = "dex/search";
pub const SEARCH_QUERY_PARAM: &str = "q";
