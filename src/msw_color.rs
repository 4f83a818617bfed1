use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Terminal colour capabilities, detected once at start-up.
/// Named ANSI colours are pinned to the Windows Terminal "Campbell" values so
/// the board looks the same across terminals that support more than 16 colours.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    true_color: bool,
    indexed_256: bool,
}

impl Palette {
    pub fn detect() -> Self {
        let support = ColorSupport::stdout();
        Palette {
            true_color: support.has_16m,
            indexed_256: support.has_256,
        }
    }

    /// Basic 16-colour palette; everything is passed through unchanged
    #[cfg(test)]
    pub fn basic() -> Self {
        Palette {
            true_color: false,
            indexed_256: false,
        }
    }

    pub fn resolve(&self, color: Color) -> Color {
        let Some(((r, g, b), index256)) = campbell(color) else {
            return color;
        };
        if self.true_color {
            Color::Rgb(r, g, b)
        } else if self.indexed_256 {
            Color::Indexed(index256)
        } else {
            color
        }
    }

    /// Foreground for an adjacent-mine count (1..=8)
    pub fn count_color(&self, count: u8) -> Color {
        let base = match count {
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Red,
            4 => Color::Magenta,
            5 => Color::Yellow,
            6 => Color::Cyan,
            7 => Color::Black,
            _ => Color::DarkGray,
        };
        self.resolve(base)
    }
}

// ((R, G, B), ANSI-256 index)
fn campbell(color: Color) -> Option<((u8, u8, u8), u8)> {
    match color {
        Color::Black => Some(((12, 12, 12), 232)),
        Color::Red => Some(((197, 15, 31), 160)),
        Color::Green => Some(((19, 161, 14), 28)),
        Color::Yellow => Some(((193, 156, 0), 178)),
        Color::Blue => Some(((0, 55, 218), 20)),
        Color::Magenta => Some(((136, 23, 152), 90)),
        Color::Cyan => Some(((58, 150, 221), 38)),
        Color::Gray => Some(((204, 204, 204), 250)),
        Color::DarkGray => Some(((118, 118, 118), 243)),
        Color::LightBlue => Some(((59, 120, 255), 63)),
        Color::White => Some(((242, 242, 242), 255)),
        _ => None,
    }
}
