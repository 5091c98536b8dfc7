pub mod colors;

pub use colors::Color;

use powermon_config::ThemeConfig;
use ratatui::style::{Modifier, Style};

/// Compiled theme derived from [`ThemeConfig`].
///
/// Calling [`Theme::from_config`] is infallible; invalid colour strings fall
/// back to the built-in palette.
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent:  Color,
    pub power:   Color,
    pub label:   Color,
    pub value:   Color,
    pub rising:  Color,
    pub falling: Color,
    pub stable:  Color,
    pub axis:    Color,
    pub error:   Color,
}

impl Theme {
    /// Build a [`Theme`] from the config file's `[theme]` section.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        Self {
            accent:  Color::from_hex(&cfg.accent).unwrap_or(Color::PURPLE),
            power:   Color::from_hex(&cfg.power).unwrap_or(Color::GREEN),
            label:   Color::from_hex(&cfg.label).unwrap_or(Color::GREY),
            value:   Color::from_hex(&cfg.value).unwrap_or(Color::WHITE),
            rising:  Color::from_hex(&cfg.rising).unwrap_or(Color::RED),
            falling: Color::from_hex(&cfg.falling).unwrap_or(Color::LIME),
            stable:  Color::from_hex(&cfg.stable).unwrap_or(Color::YELLOW),
            axis:    Color::from_hex(&cfg.axis).unwrap_or(Color::DIM),
            error:   Color::from_hex(&cfg.error).unwrap_or(Color::RED),
        }
    }

    /// Plain foreground style for `color`.
    pub fn fg(&self, color: Color) -> Style {
        Style::default().fg(color.to_ratatui())
    }

    /// Bold foreground style for `color`.
    pub fn bold(&self, color: Color) -> Style {
        self.fg(color).add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_colours_fall_back() {
        let cfg = ThemeConfig {
            accent: "not-a-colour".into(),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&cfg);
        assert_eq!(theme.accent, Color::PURPLE);
    }

    #[test]
    fn custom_colours_are_used() {
        let cfg = ThemeConfig {
            power: "#010203".into(),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&cfg);
        assert_eq!(theme.power, Color { r: 1, g: 2, b: 3 });
    }
}
