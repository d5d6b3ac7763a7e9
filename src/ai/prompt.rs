//! Reusable prompts using Handlebars for templating. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers. This is ideal since input
//! from users and output from LLMs should be considered untrusted.

use std::fmt;

use handlebars::{Handlebars, no_escape};

#[derive(Debug)]
pub enum Prompt {
    MeetingIntent,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const MEETING_INTENT_PROMPT: &str = r#"
Extract meeting metadata from the following user request. Return a JSON object only, with keys:
title (string or null), duration (minutes, integer or null), attendees (list of names or emails), window (object with keys start and end in ISO 8601 UTC, or null), mode (online, in-person or other).

Today is {{today}} (UTC).

User request: """{{text}}"""

If a precise date wasn't mentioned, choose the next calendar day (tomorrow) as the window, from 09:00 to 17:00 UTC.
If only a time range like 'between 3-5pm tomorrow' is mentioned, set start to the start of the range and end to the end.
Return JSON.
"#;

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Prompts are plain text, HTML escaping would mangle quotes and
    // ampersands in the user's request
    registry.register_escape_fn(no_escape);
    registry
        .register_template_string(&Prompt::MeetingIntent.to_string(), MEETING_INTENT_PROMPT)
        .expect("Failed to register template");
    registry
}
