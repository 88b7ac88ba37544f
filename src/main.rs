use dexscreener_rs::{
    components::dexscreener::DexScreener,
    config::{settings::Settings, storage::STARRED_TREE_NAME},
    db::{starred::StarredTokens, storage::SledStore},
    views::{
        commands::{Command, HELP},
        pairs::{pair_at_row, pair_detail, resolve_pair_address, result_rows},
    },
    workers::search::{SearchEvent, SearchOrchestrator},
};
use log::{error, info, warn};
use simple_logger::SimpleLogger;
use std::{error::Error, sync::Arc};
use tokio::io::{self, AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;

    SimpleLogger::new()
        .with_colors(true)
        .with_level(settings.log_level)
        .init()?;

    let store = SledStore::open(&settings.db_path, STARRED_TREE_NAME)?;
    let stars = Arc::new(StarredTokens::new(store));
    let api = DexScreener::new(&settings.api_url)?;
    let (search, mut events) = SearchOrchestrator::new(api);

    let search_ref = search.clone();
    let stars_ref = Arc::clone(&stars);

    tokio::task::spawn(async move {
        while let Some(event) = events.recv().await {
            let SearchEvent::Success { query, count } = event;

            println!("Search Success: found {} pairs for {:?}", count, query);

            let starred = match stars_ref.list().await {
                Ok(starred) => starred,
                Err(e) => {
                    error!("read starred tokens: {}", e);

                    Vec::new()
                }
            };

            if let Some(result) = search_ref.result().await {
                for row in result_rows(&result, &starred) {
                    println!("{}", row);
                }
            }
        }
    });

    info!("db: {}, api: {}", settings.db_path, settings.api_url);
    println!("{}", HELP);

    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Query(text) => search.set_query(&text).await,
            Command::Show(arg) => {
                let result = search.result().await;

                match pair_at_row(&arg, result.as_ref()) {
                    Some(pair) => println!("{}", pair_detail(pair)),
                    None => warn!("no pair at row {}", arg),
                }
            }
            Command::Star(arg) => {
                let result = search.result().await;
                let Some(address) = resolve_pair_address(&arg, result.as_ref()) else {
                    warn!("no pair at row {}", arg);

                    continue;
                };
                let label = result
                    .as_ref()
                    .and_then(|r| r.pairs().iter().find(|p| p.pair_address == address))
                    .map(|p| p.display_name())
                    .unwrap_or_else(|| address.clone());

                match stars.contains(&address).await {
                    Ok(true) => {
                        println!("Already starred: {}", label);

                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        error!("star {}: {}", address, e);

                        continue;
                    }
                }

                match stars.add(&address).await {
                    Ok(()) => println!("Starred Success: {}", label),
                    Err(e) => error!("star {}: {}", address, e),
                }
            }
            Command::Unstar(address) => {
                if let Err(e) = stars.remove(&address).await {
                    error!("unstar {}: {}", address, e);
                }
            }
            Command::Stars => match stars.list().await {
                Ok(starred) if starred.is_empty() => println!("no starred tokens"),
                Ok(starred) => {
                    for address in starred {
                        println!("* {}", address);
                    }
                }
                Err(e) => error!("read starred tokens: {}", e),
            },
            Command::Clear => {
                if let Err(e) = stars.clear().await {
                    error!("clear starred tokens: {}", e);
                }
            }
            Command::Quit => break,
            Command::Unknown(line) => warn!("unknown command {:?}. {}", line, HELP),
        }
    }

    Ok(())
}
