use std::env;

use anyhow::{Context, Result, bail};

use crate::ai::intent::IntentParser;
use crate::google::gcal::{DEFAULT_API_BASE_URL, GoogleAuth, GoogleCalendar};
use crate::google::oauth::DEFAULT_OAUTH_BASE_URL;
use crate::openai::OpenAiTextService;
use crate::scheduler::{DEFAULT_MAX_SUGGESTIONS, MeetingAgent};

/// Google credentials as they appear in the environment. Either an
/// access token, or the client and refresh token needed to mint one.
#[derive(Clone, Debug, Default)]
pub struct GoogleCredentials {
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_model: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub calendar_id: String,
    pub google_api_base_url: String,
    pub google_oauth_base_url: String,
    pub google_credentials: GoogleCredentials,
    pub max_suggestions: usize,
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let openai_api_hostname = env::var("SCHEDULER_LLM_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let openai_model =
            env::var("SCHEDULER_LLM_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());
        let calendar_id =
            env::var("SCHEDULER_CALENDAR_ID").unwrap_or_else(|_| "primary".to_string());
        let google_api_base_url = env::var("SCHEDULER_GOOGLE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let google_oauth_base_url = env::var("SCHEDULER_GOOGLE_OAUTH_URL")
            .unwrap_or_else(|_| DEFAULT_OAUTH_BASE_URL.to_string());
        let max_suggestions = match optional_var("SCHEDULER_MAX_SUGGESTIONS") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("Invalid SCHEDULER_MAX_SUGGESTIONS: {}", v))?,
            None => DEFAULT_MAX_SUGGESTIONS,
        };
        let google_credentials = GoogleCredentials {
            access_token: optional_var("SCHEDULER_GOOGLE_ACCESS_TOKEN"),
            client_id: optional_var("SCHEDULER_GOOGLE_CLIENT_ID"),
            client_secret: optional_var("SCHEDULER_GOOGLE_CLIENT_SECRET"),
            refresh_token: optional_var("SCHEDULER_GOOGLE_REFRESH_TOKEN"),
        };

        Ok(Self {
            openai_model,
            openai_api_hostname,
            openai_api_key,
            calendar_id,
            google_api_base_url,
            google_oauth_base_url,
            google_credentials,
            max_suggestions,
        })
    }

    /// Resolve how to authorize calendar calls. A refresh token takes
    /// precedence over a static access token since it won't expire
    /// mid session.
    pub fn google_auth(&self) -> Result<GoogleAuth> {
        let GoogleCredentials {
            access_token,
            client_id,
            client_secret,
            refresh_token,
        } = &self.google_credentials;

        match (client_id, client_secret, refresh_token, access_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token), _) => {
                Ok(GoogleAuth::RefreshToken {
                    oauth_base_url: self.google_oauth_base_url.clone(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    refresh_token: refresh_token.clone(),
                })
            }
            (_, _, _, Some(token)) => Ok(GoogleAuth::AccessToken(token.clone())),
            _ => bail!(
                "Missing Google credentials. Set SCHEDULER_GOOGLE_ACCESS_TOKEN or SCHEDULER_GOOGLE_CLIENT_ID, SCHEDULER_GOOGLE_CLIENT_SECRET and SCHEDULER_GOOGLE_REFRESH_TOKEN"
            ),
        }
    }

    /// Wire the OpenAI text service and Google Calendar into an agent.
    pub fn meeting_agent(&self) -> Result<MeetingAgent> {
        let text_service = OpenAiTextService::new(
            &self.openai_api_hostname,
            &self.openai_api_key,
            &self.openai_model,
        );
        let calendar = GoogleCalendar::new(
            &self.google_api_base_url,
            &self.calendar_id,
            self.google_auth()?,
        )?;

        Ok(MeetingAgent::new(
            IntentParser::new(Box::new(text_service)),
            Box::new(calendar),
            self.max_suggestions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(credentials: GoogleCredentials) -> AppConfig {
        AppConfig {
            openai_model: String::from("gpt-4o"),
            openai_api_hostname: String::from("https://api.openai.com"),
            openai_api_key: String::from("test-api-key"),
            calendar_id: String::from("primary"),
            google_api_base_url: String::from(DEFAULT_API_BASE_URL),
            google_oauth_base_url: String::from("http://oauth.test"),
            google_credentials: credentials,
            max_suggestions: 3,
        }
    }

    #[test]
    fn it_prefers_refresh_tokens() {
        let auth = config(GoogleCredentials {
            access_token: Some(String::from("static")),
            client_id: Some(String::from("id")),
            client_secret: Some(String::from("secret")),
            refresh_token: Some(String::from("refresh")),
        })
        .google_auth()
        .unwrap();

        match auth {
            GoogleAuth::RefreshToken {
                oauth_base_url,
                refresh_token,
                ..
            } => {
                assert_eq!(oauth_base_url, "http://oauth.test");
                assert_eq!(refresh_token, "refresh");
            }
            other => panic!("Unexpected auth {:?}", other),
        }
    }

    #[test]
    fn it_falls_back_to_an_access_token() {
        let auth = config(GoogleCredentials {
            access_token: Some(String::from("static")),
            client_id: Some(String::from("id")),
            ..Default::default()
        })
        .google_auth()
        .unwrap();

        assert!(matches!(auth, GoogleAuth::AccessToken(t) if t == "static"));
    }

    #[test]
    fn it_requires_some_credentials() {
        assert!(config(GoogleCredentials::default()).google_auth().is_err());
        assert!(config(GoogleCredentials::default()).meeting_agent().is_err());
    }
}
