//! One-shot dispatch commands — `handoff run` and `handoff preview`.

use anyhow::Result;
use console::style;

use handoff::config::Config;
use handoff::dispatch::{DispatchOutcome, Dispatcher};
use handoff::linear::models::priority_label;

pub async fn cmd_run() -> Result<()> {
    let config = Config::from_env()?;
    let dispatcher = Dispatcher::new(config);
    match dispatcher.run().await? {
        DispatchOutcome::Dispatched {
            identifier,
            title,
            priority,
        } => {
            println!(
                "{} Dispatched {} ({}): {}",
                style("✓").green().bold(),
                style(&identifier).bold(),
                priority_label(priority),
                title
            );
        }
        DispatchOutcome::NoEligibleTask => {
            println!("{} No eligible task to dispatch", style("·").dim());
        }
    }
    Ok(())
}

pub async fn cmd_preview() -> Result<()> {
    let config = Config::from_env()?;
    let dispatcher = Dispatcher::new(config);
    match dispatcher.preview().await? {
        Some(message) => {
            println!("{}", style("Message preview (not posted):").bold());
            println!();
            println!("{}", message);
        }
        None => println!("{} No eligible task to dispatch", style("·").dim()),
    }
    Ok(())
}
