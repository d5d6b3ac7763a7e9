use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::core::AppConfig;
use crate::scheduler::{Attendee, Availability, CalendarEvent, Suggestions};

pub(super) fn print_suggestions(suggestions: &Suggestions) {
    let parsed = &suggestions.parsed;
    println!(
        "\n{} ({} min, {}) between {} and {}",
        parsed.title.as_deref().unwrap_or("Untitled meeting"),
        parsed.duration_minutes,
        parsed.mode,
        parsed.window.start.to_rfc3339(),
        parsed.window.end.to_rfc3339()
    );
    if !parsed.attendees.is_empty() {
        println!("Attendees: {}", parsed.attendees.join(", "));
    }
    println!("{}", suggestions.message);
    for (i, slot) in suggestions.slots().iter().enumerate() {
        println!("  {}. {}", i + 1, slot);
    }
}

pub(super) fn print_event(event: &CalendarEvent) {
    println!("\nCreated \"{}\" ({})", event.summary, event.id);
    println!("Start: {}\nEnd: {}", event.start.to_rfc3339(), event.end.to_rfc3339());
    let attendees: Vec<String> = event
        .attendees
        .iter()
        .map(|a| match a {
            Attendee::Email { email } => email.clone(),
            Attendee::Named { display_name } => display_name.clone(),
        })
        .collect();
    if !attendees.is_empty() {
        println!("Attendees: {}", attendees.join(", "));
    }
    if let Some(link) = &event.html_link {
        println!("{}", link);
    }
}

/// Index of the chosen slot from 1 based user input. Blank input
/// means no booking.
fn parse_choice(input: &str, count: usize) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let agent = config.meeting_agent()?;
    let mut rl = DefaultEditor::new()?;

    println!("Describe the meeting you want, e.g. '30 min sync with Rahul tomorrow between 3-5pm'");

    loop {
        let line = match rl.readline(">>> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        rl.add_history_entry(text)?;

        let suggestions = match agent.handle_request(text).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };
        print_suggestions(&suggestions);
        if suggestions.availability == Availability::NoSlotsAvailable {
            continue;
        }

        let answer = match rl.readline("Book which slot? (enter to skip) ") {
            Ok(answer) => answer,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if answer.trim().is_empty() {
            continue;
        }
        let Some(index) = parse_choice(&answer, suggestions.slots().len()) else {
            println!("Pick a number between 1 and {}", suggestions.slots().len());
            continue;
        };

        let start = suggestions.slots()[index].start;
        match agent.create_event_from_slot(&suggestions.parsed, start).await {
            Ok(event) => print_event(&event),
            Err(err) => println!("{}", err),
        }
    }

    Ok(())
}
