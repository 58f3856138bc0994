use crate::{
    config::{wiring::Installation, Config},
    devices::runner::Runner,
    util::{async_flag, runnable::Exited},
};
use anyhow::{Context, Error};
use futures::join;

pub fn run(config: &Config) -> Result<(), Error> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("genset-controller.runtime")
        .build()
        .context("runtime")?;

    runtime.block_on(run_async(config))
}

async fn run_async(config: &Config) -> Result<(), Error> {
    let installation = Installation::new(config);
    let registrations = installation.registrations(config).context("registrations")?;
    let runner = Runner::new(
        &registrations.devices_by_id,
        &registrations.connections_requested,
    )
    .context("runner")?;

    log::info!(
        "running with {} devices, {} connections",
        registrations.devices_by_id.len(),
        registrations.connections_requested.len(),
    );

    let (exit_flag_sender, exit_flag_receiver) = async_flag::pair();

    let exit_handler = async {
        let result = tokio::signal::ctrl_c().await.context("ctrl_c");
        log::info!("exit signal received, stopping");
        exit_flag_sender.signal();
        result
    };

    let (Exited, exit_result) = join!(runner.run(exit_flag_receiver), exit_handler);
    exit_result?;

    Ok(())
}
