/// 24-bit RGB colour parsed from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const PURPLE: Self = Self { r: 0x7d, g: 0x56, b: 0xf4 }; // #7D56F4
    pub const GREEN:  Self = Self { r: 0x00, g: 0xff, b: 0x00 }; // #00FF00
    pub const GREY:   Self = Self { r: 0x88, g: 0x88, b: 0x88 }; // #888888
    pub const WHITE:  Self = Self { r: 0xff, g: 0xff, b: 0xff }; // #FFFFFF
    pub const RED:    Self = Self { r: 0xff, g: 0x55, b: 0x55 }; // #FF5555
    pub const LIME:   Self = Self { r: 0x55, g: 0xff, b: 0x55 }; // #55FF55
    pub const YELLOW: Self = Self { r: 0xff, g: 0xff, b: 0x55 }; // #FFFF55
    pub const DIM:    Self = Self { r: 0x55, g: 0x55, b: 0x55 }; // #555555

    /// Parse a CSS-style hex colour string (`#RRGGBB` or `RRGGBB`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let byte = |s: &str| -> Option<u8> { u8::from_str_radix(s, 16).ok() };

        Some(Self {
            r: byte(&hex[0..2])?,
            g: byte(&hex[2..4])?,
            b: byte(&hex[4..6])?,
        })
    }

    /// Convert to a [`ratatui::style::Color`] for use in widgets.
    #[inline]
    pub fn to_ratatui(self) -> ratatui::style::Color {
        ratatui::style::Color::Rgb(self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(Color::from_hex("#7D56F4"), Some(Color::PURPLE));
        assert_eq!(Color::from_hex("ff5555"), Some(Color::RED));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GGGGGG"), None);
        assert_eq!(Color::from_hex(""), None);
        assert_eq!(Color::from_hex("#ééé"), None);
    }

    #[test]
    fn converts_to_rgb() {
        assert_eq!(
            Color::GREEN.to_ratatui(),
            ratatui::style::Color::Rgb(0, 255, 0)
        );
    }
}
