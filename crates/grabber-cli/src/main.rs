use std::io::IsTerminal;

use clap::Parser;
use cli::{Args, Commands};
use error::{CliError, CliResult};
use grabber_config::{
    config::{generate_default_config, set_config_path, Config},
    path::resolve_path,
};
use grabber_dl::http_client::configure_http_client;
use logging::setup_logging;
use tracing::debug;
use ureq::{
    http::{HeaderMap, HeaderName, HeaderValue},
    Proxy,
};

mod cli;
mod error;
mod grab;
mod logging;
mod progress;
mod reporter;
mod utils;

/// Parses `Name: value` pairs into a header map.
fn parse_headers<'a, I>(headers: I) -> CliResult<HeaderMap>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut map = HeaderMap::new();
    for header in headers {
        let invalid = || CliError::InvalidHeader(header.clone());
        let (key, value) = header.split_once(':').ok_or_else(invalid)?;
        let key = HeaderName::from_bytes(key.trim().as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
        map.append(key, value);
    }
    Ok(map)
}

/// Applies config file HTTP settings, with command line flags taking precedence.
fn setup_http_client(args: &Args, config: &Config) -> CliResult<()> {
    let proxy = match args.proxy.as_ref().or(config.http.proxy.as_ref()) {
        Some(proxy) => {
            Some(Proxy::new(proxy).map_err(|source| {
                CliError::InvalidProxy {
                    proxy: proxy.clone(),
                    source,
                }
            })?)
        }
        None => None,
    };

    let mut headers = parse_headers(&config.http.headers)?;
    if let Some(extra) = args.header.as_ref() {
        for (key, value) in parse_headers(extra)? {
            if let Some(key) = key {
                headers.insert(key, value);
            }
        }
    }

    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.http.user_agent.clone());
    let timeout = config.timeout();

    configure_http_client(|cfg| {
        if proxy.is_some() {
            cfg.proxy = proxy;
        }

        if let Some(user_agent) = user_agent {
            cfg.user_agent = Some(user_agent);
        }

        if !headers.is_empty() {
            cfg.headers = Some(headers);
        }

        if timeout.is_some() {
            cfg.timeout = timeout;
        }
    });

    Ok(())
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    let interactive = std::io::stdout().is_terminal();
    utils::set_color(!args.no_color && interactive);
    utils::set_progress(interactive && !args.quiet && !args.json);

    setup_logging(&args);

    if let Some(ref c) = args.config {
        set_config_path(resolve_path(c)?);
    }

    match args.command {
        Commands::DefConfig => {
            generate_default_config()?;
        }
        Commands::Config => {
            let config = Config::new()?;
            print!("{}", config.to_toml()?);
        }
        Commands::Grab {
            ref collections,
            ref file,
            ref destination,
            skip_existing,
            trace,
        } => {
            let config = Config::new()?;
            setup_http_client(&args, &config)?;
            debug!("Registry lookup endpoint: {}", config.registry.lookup_url);

            let ctx = grab::GrabContext {
                collections: collections.clone(),
                file: file.clone(),
                destination: destination.clone(),
                skip_existing,
                trace,
                json: args.json,
            };
            let result = grab::grab(ctx, &config);
            progress::stop();
            result?;
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = vec![
            "Authorization: Token abc".to_string(),
            "X-Mirror:  galaxy ".to_string(),
        ];
        let map = parse_headers(&headers).unwrap();
        assert_eq!(map.get("authorization").unwrap(), "Token abc");
        assert_eq!(map.get("x-mirror").unwrap(), "galaxy");
    }

    #[test]
    fn test_parse_headers_rejects_malformed() {
        for bad in ["no-colon", ": empty-name", "Bad Name: x"] {
            let err = parse_headers(&vec![bad.to_string()]).unwrap_err();
            assert!(matches!(err, CliError::InvalidHeader(ref h) if h == bad), "{bad}");
        }
    }
}
