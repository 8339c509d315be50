mod alert;
mod environment;
mod slack;
mod utils;

use std::io::{stdin, Read};

use anyhow::{Context, Result};
use dotenv::dotenv;
use environment::DispatchEnvironment;
use log::{error, info};
use slack::{message::compose_slack_messages, render::PlainTextRenderer};
use utils::log::bootstrap_logging;

use crate::alert::message::AlertMessage;

/// Reads a single alert as JSON from stdin and delivers it to Slack.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    bootstrap_logging();
    let environment = DispatchEnvironment::current()?;
    let mut raw_alert = String::new();
    stdin()
        .read_to_string(&mut raw_alert)
        .context("Could not read the alert from stdin.")?;
    let alert = serde_json::from_str::<AlertMessage>(&raw_alert)
        .context("The alert is not a valid alert message.")?;
    let slack = environment.slack();
    let messages = compose_slack_messages(&alert, slack, &PlainTextRenderer).await;
    let deliveries = slack.deliver(&alert, &messages).await;
    let failed = deliveries
        .iter()
        .filter(|d| !d.is_success())
        .map(|d| d.address())
        .collect::<Vec<_>>();
    if failed.len() == deliveries.len() {
        error!(
            "Policy {} was not delivered to any Slack destination.",
            alert.policy().name()
        );
    } else if !failed.is_empty() {
        info!(
            "Policy {} was not delivered to {}.",
            alert.policy().name(),
            failed.join(", ")
        );
    }
    Ok(())
}
