//! Switch between inline and alternate screen with a key.

use crate::config::keybindings::KeybindingsConfig;
use crate::core::{Command, Message, Model};
use crate::theme::Styles;

const ALTSCREEN_MODE: &str = " altscreen mode ";
const INLINE_MODE: &str = " inline mode ";

pub struct AltScreen {
    altscreen: bool,
    quitting: bool,
    keys: KeybindingsConfig,
}

impl AltScreen {
    pub const fn new(keys: KeybindingsConfig) -> Self {
        Self {
            altscreen: false,
            quitting: false,
            keys,
        }
    }

    /// Match the initial alternate screen option of the program.
    #[must_use]
    pub fn starting_in_altscreen(mut self, altscreen: bool) -> Self {
        self.altscreen = altscreen;
        self
    }

    pub const fn altscreen(&self) -> bool {
        self.altscreen
    }
}

impl Model for AltScreen {
    type Message = ();

    fn update(mut self, message: Message<()>) -> (Self, Command<()>) {
        let Message::Key(key) = message else {
            return (self, Command::none());
        };

        if self.keys.quit.matches(&key) {
            self.quitting = true;
            return (self, Command::quit());
        }
        if self.keys.toggle_screen.matches(&key) {
            let cmd = if self.altscreen {
                Command::exit_alt_screen()
            } else {
                Command::enter_alt_screen()
            };
            self.altscreen = !self.altscreen;
            return (self, cmd);
        }
        (self, Command::none())
    }

    fn view(&self, styles: &Styles) -> String {
        if self.quitting {
            return "Bye!\n".to_string();
        }

        let mode = if self.altscreen {
            ALTSCREEN_MODE
        } else {
            INLINE_MODE
        };
        format!(
            " You're in {}{}\n",
            styles.keyword(mode),
            styles.help(" space: switch modes / q: exit")
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::{Program, ProgramOptions, ScreenRequest};
    use crate::testing::SharedOutput;

    fn key(s: &str) -> Message<()> {
        Message::Key(s.parse().unwrap())
    }

    #[test]
    fn test_space_toggles_screen() {
        let model = AltScreen::new(KeybindingsConfig::default());
        let (model, cmd) = model.update(key(" "));
        assert!(model.altscreen());
        assert!(matches!(
            cmd,
            Command::Screen(ScreenRequest::EnterAltScreen)
        ));

        let (model, cmd) = model.update(key(" "));
        assert!(!model.altscreen());
        assert!(matches!(cmd, Command::Screen(ScreenRequest::ExitAltScreen)));
        assert!(model.view(&Styles::plain()).contains(" inline mode "));
    }

    #[test]
    fn test_quit_keys() {
        for k in ["q", "ctrl+c", "esc"] {
            let (model, cmd) = AltScreen::new(KeybindingsConfig::default()).update(key(k));
            assert!(cmd.requests_quit(), "{k} should quit");
            assert_eq!(model.view(&Styles::plain()), "Bye!\n");
        }
    }

    #[test]
    fn test_view_names_mode() {
        let model = AltScreen::new(KeybindingsConfig::default());
        let view = model.view(&Styles::plain());
        assert_eq!(view, " You're in  inline mode  space: switch modes / q: exit\n");

        let model = model.starting_in_altscreen(true);
        assert!(model.view(&Styles::plain()).contains("altscreen mode"));
    }

    #[tokio::test]
    async fn test_toggling_twice_returns_to_inline() {
        let out = SharedOutput::default();
        let program = Program::with_output(AltScreen::new(KeybindingsConfig::default()), out.clone())
            .with_options(ProgramOptions::headless())
            .with_styles(Styles::plain());
        let handle = program.handle();

        let driver = async {
            let pause = Duration::from_millis(20);
            tokio::time::sleep(pause).await;
            let before = out.screen();
            assert!(before.contains(" inline mode "));

            handle.send_message(key(" "));
            tokio::time::sleep(pause).await;
            let parser = out.parser();
            assert!(parser.screen().alternate_screen());
            assert!(parser.screen().contents().contains(" altscreen mode "));

            handle.send_message(key(" "));
            tokio::time::sleep(pause).await;
            assert!(!out.parser().screen().alternate_screen());
            assert_eq!(out.screen(), before);

            handle.send_message(key("q"));
        };
        let (result, ()) = tokio::join!(program.run(), driver);
        let model = result.unwrap();
        assert!(!model.altscreen());

        let bytes = out.bytes();
        let text = String::from_utf8_lossy(&bytes);
        let entered = text.find("\x1b[?1049h").unwrap();
        let left = text.find("\x1b[?1049l").unwrap();
        assert!(entered < left);

        let parser = out.parser();
        assert!(!parser.screen().alternate_screen());
        assert!(parser.screen().contents().contains("Bye!"));
    }
}
