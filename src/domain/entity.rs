/// Entities: PlayerToken and the platform color tags.
/// Records only; the renderer maps them to whatever it draws.

/// Display color of a platform. Fixed 10-entry palette.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ColorTag {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Magenta,
    Gray,
    DarkGray,
}

impl ColorTag {
    pub const ALL: [ColorTag; 10] = [
        ColorTag::Red,
        ColorTag::Orange,
        ColorTag::Yellow,
        ColorTag::Green,
        ColorTag::Cyan,
        ColorTag::Blue,
        ColorTag::Purple,
        ColorTag::Magenta,
        ColorTag::Gray,
        ColorTag::DarkGray,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorTag::Red      => "red",
            ColorTag::Orange   => "orange",
            ColorTag::Yellow   => "yellow",
            ColorTag::Green    => "green",
            ColorTag::Cyan     => "cyan",
            ColorTag::Blue     => "blue",
            ColorTag::Purple   => "purple",
            ColorTag::Magenta  => "magenta",
            ColorTag::Gray     => "gray",
            ColorTag::DarkGray => "darkgray",
        }
    }

    /// Case-insensitive; accepts "grey" spellings and "dark-gray"/"dark_gray".
    pub fn from_name(s: &str) -> Option<ColorTag> {
        let norm: String = s.trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .collect();
        match norm.as_str() {
            "red"                   => Some(ColorTag::Red),
            "orange"                => Some(ColorTag::Orange),
            "yellow"                => Some(ColorTag::Yellow),
            "green"                 => Some(ColorTag::Green),
            "cyan"                  => Some(ColorTag::Cyan),
            "blue"                  => Some(ColorTag::Blue),
            "purple"                => Some(ColorTag::Purple),
            "magenta"               => Some(ColorTag::Magenta),
            "gray" | "grey"         => Some(ColorTag::Gray),
            "darkgray" | "darkgrey" => Some(ColorTag::DarkGray),
            _ => None,
        }
    }
}

/// The active player piece.
///
/// On a miss the token is retired where it fell and a fresh one takes
/// its place, so `generation` identifies which token is current.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlayerToken {
    pub position: f32,
    pub generation: u32,
}

impl PlayerToken {
    pub fn new(position: f32) -> Self {
        PlayerToken { position, generation: 0 }
    }

    /// Retire this token and replace it with the next generation at `respawn_at`.
    /// Returns the retired token.
    pub fn respawn(&mut self, respawn_at: f32) -> PlayerToken {
        let retired = *self;
        self.position = respawn_at;
        self.generation += 1;
        retired
    }
}
