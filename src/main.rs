use std::process::ExitCode;

use anyhow::Context;
use dataset_readmes::changes::GitHistory;
use dataset_readmes::config::RunConfig;
use dataset_readmes::data::loader::LocalCache;
use dataset_readmes::error::{RefreshError, EXIT_FAILED};
use dataset_readmes::pipeline::Pipeline;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log::error!("{e:#}");
            let code = e
                .downcast_ref::<RefreshError>()
                .map_or(EXIT_FAILED, RefreshError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run() -> anyhow::Result<u8> {
    let config = RunConfig::from_env().context("reading configuration")?;

    let history = GitHistory::new(&config.root);
    let source = LocalCache::new(config.cache_path());
    let mut pipeline = Pipeline::from_catalog(config);
    let report = pipeline.run(&history, &source)?;

    log::debug!("{}", serde_json::to_string(&report)?);
    log::info!(
        "{} changed, {} regenerated, {} failed{}",
        report.changed.len(),
        report.processed.len(),
        report.failures.len(),
        if report.catalog_written { ", catalog summary updated" } else { "" }
    );
    Ok(report.exit_code())
}
