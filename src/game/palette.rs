//! Color tokens supplied by the theming layer. The field treats the palette
//! as an opaque ordered list; tokens that fail to parse are dropped rather
//! than surfaced as errors.

use serde::{Deserialize, Serialize};

use super::rng::Rng;

/// Fallback when the theming layer hands us nothing usable.
const FALLBACK: Rgb = Rgb {
    r: 100.0,
    g: 255.0,
    b: 218.0,
};

/// Default token set used when the host does not override the theme.
pub const DEFAULT_TOKENS: &[&str] = &[
    "#64ffda", // primary
    "#4dd0e1", // secondary
    "#80cbc4",
    "#a5d6ff", // accent
    "#7c9fff",
    "#b388ff",
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Parses `#rgb` or `#rrggbb`. Anything else is rejected.
    pub fn parse(token: &str) -> Option<Rgb> {
        let hex = token.strip_prefix('#')?;
        let (r, g, b) = match hex.len() {
            3 => {
                let mut it = hex.chars();
                let d = |c: char| c.to_digit(16).map(|v| (v * 17) as f64);
                (d(it.next()?)?, d(it.next()?)?, d(it.next()?)?)
            }
            6 => {
                let d = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64);
                (d(&hex[0..2])?, d(&hex[2..4])?, d(&hex[4..6])?)
            }
            _ => return None,
        };
        Some(Rgb { r, g, b })
    }

    /// One geometric step toward `target`; `rate` is the per-frame fraction.
    pub fn step_toward(&mut self, target: Rgb, rate: f64) {
        self.r += (target.r - self.r) * rate;
        self.g += (target.g - self.g) * rate;
        self.b += (target.b - self.b) * rate;
    }

    pub fn to_css(&self, alpha: f64) -> String {
        format!(
            "rgba({},{},{},{})",
            self.r.round() as u8,
            self.g.round() as u8,
            self.b.round() as u8,
            alpha
        )
    }
}

/// Parsed palette; invalid or empty token lists degrade to a single fallback
/// color so rendering never fails.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut colors: Vec<Rgb> = tokens
            .iter()
            .filter_map(|t| Rgb::parse(t.as_ref()))
            .collect();
        if colors.is_empty() {
            colors.push(FALLBACK);
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        false // never empty by construction
    }

    /// First palette entry; used for connection lines.
    pub fn primary(&self) -> Rgb {
        self.colors[0]
    }

    pub fn random(&self, rng: &mut Rng) -> Rgb {
        self.colors[rng.next_index(self.colors.len())]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_tokens(DEFAULT_TOKENS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(
            Rgb::parse("#64ffda"),
            Some(Rgb {
                r: 100.0,
                g: 255.0,
                b: 218.0
            })
        );
        assert_eq!(
            Rgb::parse("#fff"),
            Some(Rgb {
                r: 255.0,
                g: 255.0,
                b: 255.0
            })
        );
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert_eq!(Rgb::parse(""), None);
        assert_eq!(Rgb::parse("64ffda"), None);
        assert_eq!(Rgb::parse("#64ffd"), None);
        assert_eq!(Rgb::parse("#zzzzzz"), None);
    }

    #[test]
    fn invalid_tokens_are_filtered_not_fatal() {
        let p = Palette::from_tokens(&["#112233", "not-a-color", "#445566"]);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn empty_palette_falls_back() {
        let p = Palette::from_tokens::<&str>(&[]);
        assert_eq!(p.len(), 1);
        let p = Palette::from_tokens(&["nope", ""]);
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn color_step_converges() {
        let mut c = Rgb {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        };
        let target = Rgb {
            r: 200.0,
            g: 100.0,
            b: 50.0,
        };
        for _ in 0..500 {
            c.step_toward(target, 0.05);
        }
        assert!((c.r - target.r).abs() < 1.0);
        assert!((c.g - target.g).abs() < 1.0);
        assert!((c.b - target.b).abs() < 1.0);
    }

    #[test]
    fn css_formatting_rounds_channels() {
        let c = Rgb {
            r: 99.6,
            g: 0.0,
            b: 255.0,
        };
        assert_eq!(c.to_css(0.5), "rgba(100,0,255,0.5)");
    }
}
