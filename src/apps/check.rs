//! Check a server's status while a spinner runs.

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::keybindings::KeybindingsConfig;
use crate::core::{Command, Message, Model};
use crate::theme::Styles;
use crate::widget::Spinner;

pub const DEFAULT_URL: &str = "https://charm.sh/";

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckMsg {
    Status(u16),
    Failed(String),
}

/// Issue a GET to `url` and report the status code.
pub fn check_server(url: String) -> Command<CheckMsg> {
    Command::attempt(
        async move {
            let client = reqwest::Client::builder().timeout(TIMEOUT).build()?;
            let response = client.get(&url).send().await?;
            Ok::<_, reqwest::Error>(response.status().as_u16())
        },
        |result| match result {
            Ok(code) => CheckMsg::Status(code),
            Err(err) => CheckMsg::Failed(err.to_string()),
        },
    )
}

/// Reason phrase for a status code, e.g. `"OK"` for 200.
pub fn status_text(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("")
}

pub struct Check {
    url: String,
    spinner: Spinner,
    status: Option<u16>,
    error: Option<String>,
    keys: KeybindingsConfig,
}

impl Check {
    pub fn new(url: impl Into<String>, keys: KeybindingsConfig) -> Self {
        Self {
            url: url.into(),
            spinner: Spinner::new(),
            status: None,
            error: None,
            keys,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Model for Check {
    type Message = CheckMsg;

    fn init(&self) -> Command<CheckMsg> {
        Command::batch(vec![check_server(self.url.clone()), self.spinner.tick()])
    }

    fn update(mut self, message: Message<CheckMsg>) -> (Self, Command<CheckMsg>) {
        match message {
            Message::App(CheckMsg::Status(code)) => {
                self.status = Some(code);
                (self, Command::quit())
            }
            Message::App(CheckMsg::Failed(err)) => {
                self.error = Some(err);
                (self, Command::quit())
            }
            Message::Key(key) if self.keys.cancel.matches(&key) => (self, Command::quit()),
            msg => {
                self.spinner.update(&msg);
                (self, Command::none())
            }
        }
    }

    fn view(&self, styles: &Styles) -> String {
        if let Some(err) = &self.error {
            return format!("\nWe had some trouble: {}\n\n", styles.error(err));
        }

        let mut s = format!("Checking {} ...{}\n", self.url, self.spinner.view(styles));
        if let Some(code) = self.status {
            s.push_str(&styles.success(&format!("{code} {}!", status_text(code))));
        }
        format!("\n{s}\n")
    }
}
