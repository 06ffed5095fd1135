use chrono::Local;
use clap::Parser;

use crate::{cli::SchedulerArgs, core::period::period_start, prelude::*, tables::build_schedule_table};

#[derive(Parser)]
pub struct PlanArgs {
    #[clap(flatten)]
    pub scheduler: SchedulerArgs,
}

#[instrument(skip_all)]
pub fn plan(args: &PlanArgs) -> Result {
    let now = Local::now();
    let schedule = args.scheduler.scheduler().tick(now).context("failed to build the schedule")?;
    ensure!(!schedule.is_empty(), "the forecast contains no prices");
    println!("{}", build_schedule_table(&schedule, period_start(now)?));
    Ok(())
}
