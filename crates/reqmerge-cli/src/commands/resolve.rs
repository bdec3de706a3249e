//! Resolve command implementation: run the engine and print its event stream.

use miette::Result;
use reqmerge_core::config::GlobalConfig;
use reqmerge_core::event::Event;
use reqmerge_core::version::Version;
use reqmerge_resolver::{Orchestrator, ResolveOptions};
use reqmerge_util::errors::ReqmergeError;
use reqmerge_util::progress;

use crate::cli::ResolveArgs;

pub async fn exec(mut config: GlobalConfig, args: ResolveArgs) -> Result<()> {
    if let Some(url) = args.index_url {
        config.registry.index_url = url;
    }

    let target_runtime = args
        .python
        .as_deref()
        .map(Version::parse)
        .transpose()
        .map_err(|e| ReqmergeError::Config {
            message: format!("Invalid Python version: {e}"),
        })?;

    let options = ResolveOptions {
        output: args.output,
        target_runtime,
        verify: !args.no_test,
        allow_prereleases: args.pre,
        bundle_output: args.bundle_output,
    };

    let engine = Orchestrator::from_config(&config)?;
    let (handle, mut events) = engine.start(args.files, args.strategy, options);

    let spinner = progress::spinner("Resolving");
    let mut outcome: Option<(String, bool)> = None;
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    Event::Log(line) => spinner.suspend(|| println!("{line}")),
                    Event::Status(text) => {
                        if spinner.is_hidden() {
                            progress::status_info("Status", &text);
                        } else {
                            spinner.set_message(text);
                        }
                    }
                    Event::Data(pins) => {
                        tracing::debug!(count = pins.len(), "received resolved set");
                    }
                    Event::Complete { message, success } => outcome = Some((message, success)),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                spinner.finish_and_clear();
                handle.abort();
                return Err(ReqmergeError::Unexpected {
                    message: "Interrupted".to_string(),
                }
                .into());
            }
        }
    }
    spinner.finish_and_clear();

    if let Err(e) = handle.await {
        tracing::error!(error = %e, "resolution task failed");
    }

    match outcome {
        Some((message, true)) => {
            println!("--- {message} ---");
            Ok(())
        }
        Some((message, false)) => {
            println!("--- {message} ---");
            progress::status_error("Failed", &message);
            Err(ReqmergeError::Unexpected { message }.into())
        }
        None => Err(ReqmergeError::Unexpected {
            message: "Resolution ended without a result".to_string(),
        }
        .into()),
    }
}
