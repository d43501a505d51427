//! Prompt for a repository name while the list of repositories loads.

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;

use crate::config::keybindings::KeybindingsConfig;
use crate::core::{Command, Message, Model};
use crate::theme::Styles;
use crate::widget::TextInput;

pub const REPOS_URL: &str = "https://api.github.com/orgs/charmbracelet/repos";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repo {
    pub name: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReposMsg {
    Loaded(Vec<Repo>),
    Failed(String),
}

async fn fetch(url: &str) -> Result<Vec<Repo>, FetchError> {
    let body = reqwest::Client::new()
        .get(url)
        .header(ACCEPT, "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
        .header(USER_AGENT, concat!("tealeaf/", env!("CARGO_PKG_VERSION")))
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(serde_json::from_slice(&body)?)
}

pub fn fetch_repos(url: String) -> Command<ReposMsg> {
    Command::attempt(async move { fetch(&url).await }, |result| match result {
        Ok(repos) => ReposMsg::Loaded(repos),
        Err(err) => ReposMsg::Failed(err.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Load {
    Pending,
    Done(Vec<Repo>),
    Failed(String),
}

pub struct Repos {
    url: String,
    input: TextInput,
    load: Load,
    /// Index into the current suggestions.
    selected: usize,
    keys: KeybindingsConfig,
}

impl Repos {
    pub fn new(url: impl Into<String>, keys: KeybindingsConfig) -> Self {
        let mut input = TextInput::new();
        input.prompt = "charmbracelet/".to_string();
        input.placeholder = "repo...".to_string();
        input.char_limit = 50;
        input.width = 20;
        input.focus();
        Self {
            url: url.into(),
            input,
            load: Load::Pending,
            selected: 0,
            keys,
        }
    }

    pub fn value(&self) -> String {
        self.input.value()
    }

    /// Repository names starting with the current input, ignoring case.
    pub fn suggestions(&self) -> Vec<&str> {
        let Load::Done(repos) = &self.load else {
            return Vec::new();
        };
        let value = self.input.value().to_lowercase();
        if value.is_empty() {
            return Vec::new();
        }
        repos
            .iter()
            .map(|repo| repo.name.as_str())
            .filter(|name| name.to_lowercase().starts_with(&value))
            .collect()
    }

    fn complete(&mut self) {
        let suggestions = self.suggestions();
        if let Some(name) = suggestions.get(self.selected).map(|s| (*s).to_string()) {
            self.input.set_value(&name);
        }
    }

    fn cycle(&mut self, forward: bool) {
        let count = self.suggestions().len();
        if count == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % count
        } else {
            (self.selected + count - 1) % count
        };
    }

    fn status_line(&self, styles: &Styles) -> String {
        match &self.load {
            Load::Pending => styles.muted("loading repositories..."),
            Load::Failed(err) => styles.error(&format!("could not load repositories: {err}")),
            Load::Done(repos) => {
                let suggestions = self.suggestions();
                match suggestions.get(self.selected) {
                    Some(name) => styles.muted(&format!(
                        "{name} ({}/{})",
                        self.selected + 1,
                        suggestions.len()
                    )),
                    None => styles.muted(&format!("{} repositories", repos.len())),
                }
            }
        }
    }
}

impl Model for Repos {
    type Message = ReposMsg;

    fn init(&self) -> Command<ReposMsg> {
        Command::batch(vec![fetch_repos(self.url.clone()), self.input.blink()])
    }

    fn update(mut self, message: Message<ReposMsg>) -> (Self, Command<ReposMsg>) {
        match &message {
            Message::Key(key) if self.keys.submit.matches(key) || self.keys.cancel.matches(key) => {
                return (self, Command::quit());
            }
            Message::Key(key) if key.display() == "tab" => {
                self.complete();
                return (self, Command::none());
            }
            Message::Key(key) if key.display() == "ctrl+n" => {
                self.cycle(true);
                return (self, Command::none());
            }
            Message::Key(key) if key.display() == "ctrl+p" => {
                self.cycle(false);
                return (self, Command::none());
            }
            Message::App(ReposMsg::Loaded(repos)) => {
                tracing::debug!(count = repos.len(), "repositories loaded");
                self.load = Load::Done(repos.clone());
            }
            Message::App(ReposMsg::Failed(err)) => {
                tracing::warn!(error = %err, "could not load repositories");
                self.load = Load::Failed(err.clone());
            }
            _ => {}
        }

        let before = self.input.value();
        self.input.update(&message);
        if self.input.value() != before {
            self.selected = 0;
        }
        (self, Command::none())
    }

    fn view(&self, styles: &Styles) -> String {
        format!(
            "What's your favorite Charm repository?\n\n{}\n{}\n\n{}\n",
            self.input.view(styles),
            self.status_line(styles),
            styles.help("(tab to complete, ctrl+n/ctrl+p to cycle through suggestions, esc to quit)")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Key;
    use crossterm::event::KeyCode;

    fn repos() -> Repos {
        Repos::new(REPOS_URL, KeybindingsConfig::default())
    }

    fn key(s: &str) -> Message<ReposMsg> {
        Message::Key(s.parse().unwrap())
    }

    fn type_text(mut model: Repos, text: &str) -> Repos {
        for c in text.chars() {
            (model, _) = model.update(Message::Key(Key::new(KeyCode::Char(c))));
        }
        model
    }

    fn loaded(names: &[&str]) -> Message<ReposMsg> {
        Message::App(ReposMsg::Loaded(
            names
                .iter()
                .map(|name| Repo {
                    name: (*name).to_string(),
                })
                .collect(),
        ))
    }

    #[test]
    fn test_decode_repos() {
        let body = r#"[{"name": "bubbletea", "id": 1}, {"name": "lipgloss", "private": false}]"#;
        let repos: Vec<Repo> = serde_json::from_str(body).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "bubbletea");
    }

    #[test]
    fn test_submit_and_cancel_quit() {
        for k in ["enter", "ctrl+c", "esc"] {
            let (_, cmd) = repos().update(key(k));
            assert!(cmd.requests_quit(), "{k} should quit");
        }
        let (model, cmd) = repos().update(key("q"));
        assert!(!cmd.requests_quit());
        assert_eq!(model.value(), "q");
    }

    #[test]
    fn test_suggestions_and_completion() {
        let (model, _) = repos().update(loaded(&["bubbletea", "bubbles", "glow"]));
        let model = type_text(model, "bub");
        assert_eq!(model.suggestions(), vec!["bubbletea", "bubbles"]);

        let (model, _) = model.update(key("ctrl+n"));
        let (model, _) = model.update(key("tab"));
        assert_eq!(model.value(), "bubbles");
    }

    #[test]
    fn test_cycle_wraps_backwards() {
        let (model, _) = repos().update(loaded(&["glow", "gum", "bubbles"]));
        let model = type_text(model, "g");
        let (model, _) = model.update(key("ctrl+p"));
        let (model, _) = model.update(key("tab"));
        assert_eq!(model.value(), "gum");
    }

    #[test]
    fn test_view_shows_load_state() {
        let styles = Styles::plain();
        let model = repos();
        let view = model.view(&styles);
        assert!(view.starts_with("What's your favorite Charm repository?\n\ncharmbracelet/repo..."));
        assert!(view.contains("loading repositories..."));

        let (model, _) = model.update(Message::App(ReposMsg::Failed("rate limited".into())));
        assert!(model.view(&styles).contains("could not load repositories: rate limited"));

        let (model, _) = repos().update(loaded(&["glow", "gum"]));
        assert!(model.view(&styles).contains("2 repositories"));
    }

    #[test]
    fn test_blink_tick_reaches_input() {
        let model = repos();
        let view_before = model.view(&Styles::plain());
        let (model, cmd) = model.update(Message::Tick(crate::core::Tick {
            id: TextInput::BLINK_ID.into(),
            seq: 1,
        }));
        assert!(cmd.is_none());
        assert_eq!(model.view(&Styles::plain()), view_before);
    }
}
