use chrono::{DateTime, Utc};

use crate::{
    models::dexscreener::{SearchResult, TokenPair},
    utils::number::{str_to_locale_string, to_locale_string, to_short_number},
};

const MISSING: &str = "-";

fn money(value: Option<f64>) -> String {
    value
        .map(|v| format!("${}", to_locale_string(v, None)))
        .unwrap_or_else(|| MISSING.to_string())
}

fn short_money(value: Option<f64>) -> String {
    value
        .map(|v| format!("${}", to_short_number(v, 0)))
        .unwrap_or_else(|| MISSING.to_string())
}

fn amount(value: Option<f64>, symbol: &str) -> String {
    value
        .map(|v| format!("{} {}", to_locale_string(v, None), symbol))
        .unwrap_or_else(|| MISSING.to_string())
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| MISSING.to_string())
}

fn created_date(pair_created_at: Option<u64>) -> String {
    pair_created_at
        .and_then(|ms| DateTime::<Utc>::from_timestamp((ms / 1000) as i64, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Plain-text detail page for one pair.
pub fn pair_detail(pair: &TokenPair) -> String {
    let base_symbol = pair.base_token.symbol.to_uppercase();
    let quote_symbol = pair.quote_token.symbol.to_uppercase();
    let price = pair
        .price_usd
        .as_deref()
        .map(|p| format!("${}", str_to_locale_string(p, None)))
        .unwrap_or_else(|| MISSING.to_string());
    let mut lines = vec![
        pair.display_name(),
        String::new(),
        "Token Information".to_string(),
        format!("- Chain: {}", pair.chain_id),
        format!("- Dex: {}", pair.dex_id),
        format!("- Contract: {}", pair.base_token.address),
        format!("- Pair Address: {}", pair.pair_address),
        format!("- Created: {}", created_date(pair.pair_created_at)),
        format!("- URL: {}", pair.url),
        String::new(),
        "Price Information".to_string(),
        format!("- Current Price: {}", price),
        format!("- Market Cap: {}", money(pair.market_cap)),
        format!("- FDV: {}", money(pair.fdv)),
        String::new(),
        "Price Changes".to_string(),
        format!("- 5min: {}", percent(pair.price_change.m5)),
        format!("- 1h: {}", percent(pair.price_change.h1)),
        format!("- 6h: {}", percent(pair.price_change.h6)),
        format!("- 24h: {}", percent(pair.price_change.h24)),
        String::new(),
        "Liquidity".to_string(),
        format!("- Total USD: {}", money(pair.liquidity.usd)),
        format!("- Base Token: {}", amount(pair.liquidity.base, &base_symbol)),
        format!("- Quote Token: {}", amount(pair.liquidity.quote, &quote_symbol)),
        String::new(),
        "Trading Volume (24h)".to_string(),
        format!("- Volume: {}", money(pair.volume.h24)),
        format!("- Buys: {}", pair.txns.h24.buys),
        format!("- Sells: {}", pair.txns.h24.sells),
    ];

    if let Some(info) = &pair.info {
        if let Some(websites) = info.websites.as_ref().filter(|w| !w.is_empty()) {
            lines.push(String::new());
            lines.push("Websites".to_string());
            lines.extend(websites.iter().map(|w| format!("- {}: {}", w.label, w.url)));
        }
        if let Some(socials) = info.socials.as_ref().filter(|s| !s.is_empty()) {
            lines.push(String::new());
            lines.push("Social Media".to_string());
            lines.extend(socials.iter().map(|s| format!("- {}: {}", s.kind, s.url)));
        }
    }

    lines.join("\n")
}

/// One list row: `  1. * Pepe  PEPE • Market Cap: $... | Price: $... | FDV: $... | Liquidity: $...`
pub fn pair_row(index: usize, pair: &TokenPair, starred: bool) -> String {
    let price = pair
        .price_usd
        .as_deref()
        .map(|p| format!("${}", str_to_locale_string(p, None)))
        .unwrap_or_else(|| MISSING.to_string());

    format!(
        "{:>3}. {} {}  {} • Market Cap: {} | Price: {} | FDV: {} | Liquidity: {}",
        index,
        if starred { "*" } else { " " },
        pair.base_token.name,
        pair.base_token.symbol.to_uppercase(),
        money(pair.market_cap),
        price,
        short_money(pair.fdv),
        short_money(pair.liquidity.usd),
    )
}

pub fn result_rows(result: &SearchResult, starred: &[String]) -> Vec<String> {
    result
        .pairs()
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            let is_starred = starred.iter().any(|a| a == &pair.pair_address);

            pair_row(i + 1, pair, is_starred)
        })
        .collect()
}

/// Pair at a 1-based row of the current result.
pub fn pair_at_row<'a>(arg: &str, result: Option<&'a SearchResult>) -> Option<&'a TokenPair> {
    let index = arg.trim().parse::<usize>().ok()?;

    result?.pairs().get(index.checked_sub(1)?)
}

/// Resolves a `:star` argument: a 1-based row of the current result, or a raw
/// pair address.
pub fn resolve_pair_address(arg: &str, result: Option<&SearchResult>) -> Option<String> {
    let arg = arg.trim();

    if arg.is_empty() {
        return None;
    }

    match arg.parse::<usize>() {
        Ok(_) => pair_at_row(arg, result).map(|pair| pair.pair_address.clone()),
        Err(_) => Some(arg.to_string()),
    }
}
