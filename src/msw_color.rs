use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Colors used by the board view, resolved once for the terminal's capabilities
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub covered: Color,
    pub board_bg: Color,
    pub cursor_bg: Color,
    pub flag: Color,
    pub mine: Color,
    pub detonated_bg: Color,
    pub counter: Color,
    pub key: Color,
    pub numbers: [Color; 8], // Colors for adjacency counts 1..=8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    TrueColor,
    Indexed,
    Basic,
}

impl Palette {
    pub fn detect() -> Self {
        let support = ColorSupport::stdout();
        let depth = if support.has_16m {
            Depth::TrueColor
        } else if support.has_256 {
            Depth::Indexed
        } else {
            Depth::Basic
        };
        Self::for_depth(depth)
    }

    fn for_depth(depth: Depth) -> Self {
        let c = |base: Color| adapt(base, depth);
        Palette {
            covered: c(Color::Gray),
            board_bg: c(Color::DarkGray),
            cursor_bg: c(Color::LightBlue),
            flag: c(Color::Red),
            mine: c(Color::Black),
            detonated_bg: c(Color::LightRed),
            counter: c(Color::LightRed),
            key: c(Color::Yellow),
            // classic number colors: blue, green, red, navy, maroon, teal, black, gray
            numbers: [
                c(Color::LightBlue),
                c(Color::Green),
                c(Color::Red),
                c(Color::Blue),
                c(Color::Magenta),
                c(Color::Cyan),
                c(Color::Black),
                c(Color::Gray),
            ],
        }
    }

    pub fn number(&self, adj: u8) -> Color {
        match adj {
            1..=8 => self.numbers[usize::from(adj) - 1],
            _ => self.covered,
        }
    }
}

/// Map an ANSI base color to the Windows Terminal "Campbell" sample at the given depth
/// Format of the table: ((R, G, B), ANSI_256_Index)
fn adapt(base: Color, depth: Depth) -> Color {
    let sample = match base {
        Color::Black => Some(((12, 12, 12), 232)),
        Color::Red => Some(((197, 15, 31), 160)),
        Color::Green => Some(((19, 161, 14), 28)),
        Color::Yellow => Some(((193, 156, 0), 178)),
        Color::Blue => Some(((0, 55, 218), 20)),
        Color::Magenta => Some(((136, 23, 152), 90)),
        Color::Cyan => Some(((58, 150, 221), 38)),
        Color::Gray => Some(((204, 204, 204), 250)),
        Color::DarkGray => Some(((118, 118, 118), 243)),
        Color::LightRed => Some(((231, 72, 86), 203)),
        Color::LightBlue => Some(((59, 120, 255), 63)),
        _ => None,
    };
    match (sample, depth) {
        (Some(((r, g, b), _)), Depth::TrueColor) => Color::Rgb(r, g, b),
        (Some((_, idx)), Depth::Indexed) => Color::Indexed(idx),
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_picks_representation() {
        assert_eq!(adapt(Color::Red, Depth::TrueColor), Color::Rgb(197, 15, 31));
        assert_eq!(adapt(Color::Red, Depth::Indexed), Color::Indexed(160));
        assert_eq!(adapt(Color::Red, Depth::Basic), Color::Red);
        assert_eq!(adapt(Color::Rgb(1, 2, 3), Depth::Indexed), Color::Rgb(1, 2, 3));
    }

    #[test]
    fn numbers_are_one_based() {
        let p = Palette::for_depth(Depth::Basic);
        assert_eq!(p.number(1), Color::LightBlue);
        assert_eq!(p.number(8), Color::Gray);
        assert_eq!(p.number(0), p.covered);
    }
}
