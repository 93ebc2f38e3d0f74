use std::{path::Path, sync::Arc};

use grabber_config::{config::Config, load_collections, path::resolve_path, CollectionSpec};
use grabber_core::{CollectionResolver, ReporterHandle};
use grabber_dl::{fetcher::HttpFetcher, traits::Fetcher, types::OverwriteMode};
use grabber_registry::{GalaxyClient, RegistryClient};
use tracing::{debug, warn};

use crate::{
    error::{CliError, CliResult},
    progress,
    reporter::{JsonReporter, TerminalReporter},
    utils::progress_enabled,
};

pub struct GrabContext {
    pub collections: Vec<String>,
    pub file: Option<String>,
    pub destination: Option<String>,
    pub skip_existing: bool,
    pub trace: bool,
    pub json: bool,
}

/// Collections named on the command line take precedence over `--file`, which takes
/// precedence over the config file.
pub fn collect_specs(
    collections: &[String],
    file: Option<&str>,
    config: &Config,
) -> CliResult<Vec<CollectionSpec>> {
    let specs = if !collections.is_empty() {
        collections
            .iter()
            .map(|c| c.parse::<CollectionSpec>())
            .collect::<Result<Vec<_>, _>>()?
    } else if let Some(file) = file {
        load_collections(resolve_path(file)?)?
    } else {
        config.collections.clone()
    };

    if specs.is_empty() {
        return Err(CliError::NoCollections);
    }

    Ok(specs)
}

pub fn grab(ctx: GrabContext, config: &Config) -> CliResult<()> {
    let specs = collect_specs(&ctx.collections, ctx.file.as_deref(), config)?;

    let destination = match ctx.destination.as_deref() {
        Some(dest) => resolve_path(dest)?,
        None => config.destination_path()?,
    };

    let registry = GalaxyClient::new(config.registry.lookup_url.as_str())?
        .trace(ctx.trace || config.registry.trace);

    let overwrite = if ctx.skip_existing || config.skip_existing {
        OverwriteMode::Skip
    } else {
        OverwriteMode::Force
    };
    let mut fetcher = HttpFetcher::new().overwrite(overwrite);
    if progress_enabled() && !ctx.json {
        fetcher = fetcher.progress(progress::download_callback());
    }

    let reporter: ReporterHandle = if ctx.json {
        Arc::new(JsonReporter)
    } else {
        Arc::new(TerminalReporter)
    };

    debug!(
        "Grabbing {} collection(s) into {}",
        specs.len(),
        destination.display()
    );

    let resolver = CollectionResolver::new(registry, fetcher, &config.registry.download_url)
        .with_reporter(reporter);

    run(&resolver, &specs, &destination)
}

/// Resolves every collection in turn; a fatal error only stops the collection it hit.
pub fn run<R, F>(
    resolver: &CollectionResolver<R, F>,
    specs: &[CollectionSpec],
    destination: &Path,
) -> CliResult<()>
where
    R: RegistryClient,
    F: Fetcher,
{
    let mut failed = 0;
    for spec in specs {
        match resolver.resolve(spec, destination) {
            Ok(report) if report.failed() > 0 => {
                warn!(
                    "{} artifact(s) of {} could not be downloaded",
                    report.failed(),
                    spec
                );
            }
            Ok(_) => {}
            Err(_) => failed += 1,
        }
    }

    if failed > 0 {
        return Err(CliError::CollectionsFailed {
            failed,
            total: specs.len(),
        });
    }

    Ok(())
}
