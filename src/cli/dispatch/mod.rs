use crate::cli::actions::Action;
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        realm: matches
            .get_one("realm")
            .map_or_else(|| "Restricted Access".to_string(), |s: &String| s.clone()),
        nonce_ttl_seconds: matches.get_one::<u64>("nonce-ttl").copied().unwrap_or(300),
    })
}
