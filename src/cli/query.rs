use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::{
    cli::SchedulerArgs,
    prelude::*,
    query::{jsonrpc::Request, service::ScheduleQueryService, timedata::HistoryFile},
};

#[derive(Parser)]
pub struct QueryArgs {
    #[clap(flatten)]
    pub scheduler: SchedulerArgs,

    /// JSON file with the historical samples.
    #[clap(long = "history", env = "HISTORY_PATH")]
    pub history: Option<PathBuf>,

    /// JSON-RPC request.
    #[clap(long = "request", default_value = r#"{"jsonrpc":"2.0","id":1,"method":"getSchedule"}"#)]
    pub request: String,
}

#[instrument(skip_all)]
pub fn query(args: &QueryArgs) -> Result {
    let request: Request =
        serde_json::from_str(&args.request).context("failed to parse the request")?;
    let now = Local::now();
    let schedule = args.scheduler.scheduler().tick(now);
    let service = ScheduleQueryService::new(args.history.clone().map(|path| HistoryFile { path }));
    let response = service.handle(request, schedule.as_deref(), now);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
