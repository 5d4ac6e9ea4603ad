use eframe::egui::Color32;

pub trait ColorExt {
    fn parse_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Color32::from_rgb(r, g, b))
    }
}

/// Colors shared by the header, zones, chips and notices.
pub struct Palette;

impl Palette {
    pub const PRIMARY_HEX: &'static str = "#366092";
    pub const SUCCESS_HEX: &'static str = "#2e7d32";
    pub const ERROR_HEX: &'static str = "#d32f2f";
    pub const INFO_HEX: &'static str = "#0288d1";
    pub const MUTED_HEX: &'static str = "#9e9e9e";

    pub fn primary() -> Color32 {
        Color32::parse_hex(Self::PRIMARY_HEX).unwrap_or(Color32::LIGHT_BLUE)
    }

    pub fn success() -> Color32 {
        Color32::parse_hex(Self::SUCCESS_HEX).unwrap_or(Color32::GREEN)
    }

    pub fn error() -> Color32 {
        Color32::parse_hex(Self::ERROR_HEX).unwrap_or(Color32::RED)
    }

    pub fn info() -> Color32 {
        Color32::parse_hex(Self::INFO_HEX).unwrap_or(Color32::LIGHT_BLUE)
    }

    pub fn muted() -> Color32 {
        Color32::parse_hex(Self::MUTED_HEX).unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_with_or_without_hash() {
        assert_eq!(Color32::parse_hex("#366092"), Some(Color32::from_rgb(0x36, 0x60, 0x92)));
        assert_eq!(Color32::parse_hex("ffffff"), Some(Color32::WHITE));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Color32::parse_hex("#fff"), None);
        assert_eq!(Color32::parse_hex("#gggggg"), None);
        assert_eq!(Color32::parse_hex("#ééé"), None);
    }

    #[test]
    fn palette_constants_are_valid() {
        for hex in [
            Palette::PRIMARY_HEX,
            Palette::SUCCESS_HEX,
            Palette::ERROR_HEX,
            Palette::INFO_HEX,
            Palette::MUTED_HEX,
        ] {
            assert!(Color32::parse_hex(hex).is_some(), "{hex}");
        }
    }
}
