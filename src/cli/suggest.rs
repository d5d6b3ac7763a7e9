use anyhow::{Result, anyhow};

use super::schedule::{print_event, print_suggestions};
use crate::core::AppConfig;

/// One shot suggestion, optionally booking the chosen slot right away.
pub async fn run(text: &str, book: Option<usize>, config: &AppConfig) -> Result<()> {
    let agent = config.meeting_agent()?;
    let suggestions = agent.handle_request(text).await?;
    print_suggestions(&suggestions);

    if let Some(choice) = book {
        let slot = choice
            .checked_sub(1)
            .and_then(|i| suggestions.slots().get(i))
            .ok_or(anyhow!(
                "There is no slot {} to book, choose between 1 and {}",
                choice,
                suggestions.slots().len()
            ))?;
        let event = agent
            .create_event_from_slot(&suggestions.parsed, slot.start)
            .await?;
        print_event(&event);
    }

    Ok(())
}
