#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Dual-threshold color proximity.
///
/// Two colors match when every per-channel absolute difference is below
/// `channel_tolerance` and the sum of the three differences is below
/// `total_tolerance`. Both conditions are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMatchConfig {
    pub channel_tolerance: u8,
    pub total_tolerance: u16,
}

impl Default for ColorMatchConfig {
    fn default() -> Self {
        Self {
            channel_tolerance: 15,
            total_tolerance: 20,
        }
    }
}

pub fn is_similar_color(a: Rgb8, b: Rgb8, cfg: &ColorMatchConfig) -> bool {
    let dr = a.r.abs_diff(b.r);
    let dg = a.g.abs_diff(b.g);
    let db = a.b.abs_diff(b.b);

    if dr >= cfg.channel_tolerance || dg >= cfg.channel_tolerance || db >= cfg.channel_tolerance {
        return false;
    }

    (dr as u16 + dg as u16 + db as u16) < cfg.total_tolerance
}

/// Decides whether a pixel belongs to the drawn boundary.
///
/// A pixel is a line pixel when it is similar to either of the two reference
/// colors. Pure predicate, no state beyond the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClassifier {
    pub reference: [Rgb8; 2],
    pub match_cfg: ColorMatchConfig,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self {
            reference: [Rgb8::new(255, 127, 127), Rgb8::new(127, 0, 0)],
            match_cfg: ColorMatchConfig::default(),
        }
    }
}

impl LineClassifier {
    pub fn new(primary: Rgb8, secondary: Rgb8, match_cfg: ColorMatchConfig) -> Self {
        Self {
            reference: [primary, secondary],
            match_cfg,
        }
    }

    pub fn is_line(&self, px: Rgb8) -> bool {
        is_similar_color(px, self.reference[0], &self.match_cfg)
            || is_similar_color(px, self.reference[1], &self.match_cfg)
    }
}
