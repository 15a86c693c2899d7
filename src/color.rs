use thiserror::Error;

/// Normalized RGB color, each channel in [0, 1]
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color {0:?}, expected #RRGGBB or #RGB")]
    InvalidHex(String),
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Parse a CSS style hex color ("#1E3D58", "1e3d58" or "#fa0")
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let invalid = || ColorError::InvalidHex(hex.to_owned());

    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channels: [u8; 3] = match digits.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
            [
                channel(0).map_err(|_| invalid())?,
                channel(2).map_err(|_| invalid())?,
                channel(4).map_err(|_| invalid())?,
            ]
        }
        3 => {
            // #RGB expands each nibble, 0xA -> 0xAA
            let channel = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
            [
                channel(0).map_err(|_| invalid())?,
                channel(1).map_err(|_| invalid())?,
                channel(2).map_err(|_| invalid())?,
            ]
        }
        _ => return Err(invalid()),
    };

    let [r, g, b] = channels.map(|c| c as f32 / 255.0);
    Ok(Rgb { r, g, b })
}
