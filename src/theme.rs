use catppuccin::PALETTE;
use crossterm::style::{Attribute, Color, ContentStyle};

/// Convert a catppuccin color to a terminal color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb {
        r: c.rgb.r,
        g: c.rgb.g,
        b: c.rgb.b,
    }
}

/// Palette the styles are built from.
///
/// The default `ansi` theme uses 256-color indices so it looks the same on
/// terminals without true color support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub keyword_fg: Color,
    pub keyword_bg: Color,
    pub help: Color,
    pub accent: Color,
    pub muted: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    /// 256-color palette.
    #[must_use]
    pub const fn ansi() -> Self {
        Self {
            keyword_fg: Color::AnsiValue(204),
            keyword_bg: Color::AnsiValue(235),
            help: Color::AnsiValue(241),
            accent: Color::AnsiValue(63),
            muted: Color::AnsiValue(240),
            success: Color::AnsiValue(42),
            error: Color::AnsiValue(203),
        }
    }

    /// Create a theme from a Catppuccin flavor.
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            keyword_fg: catppuccin_to_color(&c.pink),
            keyword_bg: catppuccin_to_color(&c.surface0),
            help: catppuccin_to_color(&c.overlay1),
            accent: catppuccin_to_color(&c.lavender),
            muted: catppuccin_to_color(&c.overlay0),
            success: catppuccin_to_color(&c.green),
            error: catppuccin_to_color(&c.red),
        }
    }

    /// Catppuccin Mocha theme (dark).
    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    /// Catppuccin Latte theme (light).
    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    /// Catppuccin Frappé theme (dark).
    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    /// Catppuccin Macchiato theme (dark).
    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::ansi()
    }
}

/// Information about a theme for lookups by name.
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    /// Name used in the config file and on the command line
    pub name: &'static str,
    /// The theme instance
    pub theme: Theme,
}

impl ThemeInfo {
    const fn new(name: &'static str, theme: Theme) -> Self {
        Self { name, theme }
    }
}

impl std::fmt::Display for ThemeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Returns a list of all available built-in themes.
pub fn available_themes() -> Vec<ThemeInfo> {
    vec![
        ThemeInfo::new("ansi", Theme::ansi()),
        ThemeInfo::new("Catppuccin Mocha", Theme::catppuccin_mocha()),
        ThemeInfo::new("Catppuccin Macchiato", Theme::catppuccin_macchiato()),
        ThemeInfo::new("Catppuccin Frappé", Theme::catppuccin_frappe()),
        ThemeInfo::new("Catppuccin Latte", Theme::catppuccin_latte()),
    ]
}

/// Look up a theme by name, ignoring case. Returns `None` for unknown names.
pub fn theme_from_name(name: &str) -> Option<Theme> {
    available_themes()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .map(|t| t.theme)
}

/// Whether escape sequences for color may be emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorProfile {
    #[default]
    Color,
    /// `NO_COLOR` is set or the terminal is `dumb`.
    Plain,
}

impl ColorProfile {
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        let dumb = std::env::var("TERM").is_ok_and(|term| term == "dumb");
        Self::detect(no_color, dumb)
    }

    const fn detect(no_color: bool, dumb: bool) -> Self {
        if no_color || dumb {
            Self::Plain
        } else {
            Self::Color
        }
    }
}

/// Colors plus the few attributes the views use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub reverse: bool,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            reverse: false,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    fn content_style(self) -> ContentStyle {
        let mut style = ContentStyle {
            foreground_color: self.fg,
            background_color: self.bg,
            ..ContentStyle::default()
        };
        if self.bold {
            style.attributes.set(Attribute::Bold);
        }
        if self.reverse {
            style.attributes.set(Attribute::Reverse);
        }
        style
    }
}

/// Style configuration handed to [`Model::view`](crate::core::Model::view).
///
/// Built once at startup from a [`Theme`] and a [`ColorProfile`] and passed
/// explicitly, so views never consult process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styles {
    pub profile: ColorProfile,
    pub keyword: Style,
    pub help: Style,
    pub accent: Style,
    pub muted: Style,
    pub success: Style,
    pub error: Style,
    /// Text input cursor.
    pub cursor: Style,
}

impl Styles {
    pub const fn new(theme: &Theme, profile: ColorProfile) -> Self {
        Self {
            profile,
            keyword: Style::new().fg(theme.keyword_fg).bg(theme.keyword_bg),
            help: Style::new().fg(theme.help),
            accent: Style::new().fg(theme.accent),
            muted: Style::new().fg(theme.muted),
            success: Style::new().fg(theme.success).bold(),
            error: Style::new().fg(theme.error).bold(),
            cursor: Style::new().fg(theme.accent).reverse(),
        }
    }

    /// Styles that never emit escape sequences.
    pub const fn plain() -> Self {
        Self::new(&Theme::ansi(), ColorProfile::Plain)
    }

    /// Apply `style` to `text`, or return it unchanged under a plain profile.
    pub fn paint(&self, style: Style, text: &str) -> String {
        match self.profile {
            ColorProfile::Plain => text.to_string(),
            ColorProfile::Color => style.content_style().apply(text).to_string(),
        }
    }

    pub fn keyword(&self, text: &str) -> String {
        self.paint(self.keyword, text)
    }

    pub fn help(&self, text: &str) -> String {
        self.paint(self.help, text)
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(self.success, text)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(self.error, text)
    }

    pub fn cursor(&self, text: &str) -> String {
        self.paint(self.cursor, text)
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::new(&Theme::default(), ColorProfile::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_lookup_ignores_case() {
        assert_eq!(theme_from_name("catppuccin mocha"), Some(Theme::catppuccin_mocha()));
        assert_eq!(theme_from_name("ANSI"), Some(Theme::ansi()));
        assert_eq!(theme_from_name("solarized"), None);
    }

    #[test]
    fn test_plain_profile_emits_no_escapes() {
        let styles = Styles::plain();
        assert_eq!(styles.keyword(" inline mode "), " inline mode ");
    }

    #[test]
    fn test_color_profile_wraps_text() {
        let styles = Styles::new(&Theme::ansi(), ColorProfile::Color);
        let painted = styles.keyword("mode");
        assert!(painted.starts_with("\x1b["));
        assert!(painted.contains("38;5;204"));
        assert!(painted.contains("48;5;235"));
        assert!(painted.contains("mode"));
    }

    #[test]
    fn test_profile_detection() {
        assert_eq!(ColorProfile::detect(true, false), ColorProfile::Plain);
        assert_eq!(ColorProfile::detect(false, true), ColorProfile::Plain);
        assert_eq!(ColorProfile::detect(false, false), ColorProfile::Color);
    }
}
