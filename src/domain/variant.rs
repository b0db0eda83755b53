// ============================================================
// Layer 3 — Model Variants
// ============================================================
// SqueezeNext ships in two widths (1x, 2x) and two depth
// layouts (the default 23-block layout and "v5", which moves
// blocks from the first two stages into the third).
//
//   name             width   blocks per stage
//   SqNxt_23_1x      1.0     [6, 6,  8, 1]
//   SqNxt_23_1x_v5   1.0     [2, 4, 14, 1]
//   SqNxt_23_2x      2.0     [6, 6,  8, 1]
//   SqNxt_23_2x_v5   2.0     [2, 4, 14, 1]

use std::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

const BLOCKS_23:    [usize; 4] = [6, 6, 8, 1];
const BLOCKS_23_V5: [usize; 4] = [2, 4, 14, 1];

/// One of the supported network configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelVariant {
    #[serde(rename = "SqNxt_23_1x")]
    Sqnxt23x1,
    #[serde(rename = "SqNxt_23_1x_v5")]
    Sqnxt23x1V5,
    #[serde(rename = "SqNxt_23_2x")]
    Sqnxt23x2,
    #[serde(rename = "SqNxt_23_2x_v5")]
    Sqnxt23x2V5,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 4] = [
        ModelVariant::Sqnxt23x1,
        ModelVariant::Sqnxt23x1V5,
        ModelVariant::Sqnxt23x2,
        ModelVariant::Sqnxt23x2V5,
    ];

    /// Channel width multiplier applied to every layer
    pub fn width(&self) -> f64 {
        match self {
            ModelVariant::Sqnxt23x1 | ModelVariant::Sqnxt23x1V5 => 1.0,
            ModelVariant::Sqnxt23x2 | ModelVariant::Sqnxt23x2V5 => 2.0,
        }
    }

    /// Number of residual blocks in each of the four stages
    pub fn blocks(&self) -> [usize; 4] {
        match self {
            ModelVariant::Sqnxt23x1 | ModelVariant::Sqnxt23x2     => BLOCKS_23,
            ModelVariant::Sqnxt23x1V5 | ModelVariant::Sqnxt23x2V5 => BLOCKS_23_V5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelVariant::Sqnxt23x1   => "SqNxt_23_1x",
            ModelVariant::Sqnxt23x1V5 => "SqNxt_23_1x_v5",
            ModelVariant::Sqnxt23x2   => "SqNxt_23_2x",
            ModelVariant::Sqnxt23x2V5 => "SqNxt_23_2x_v5",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the variant name, ignoring ASCII case so that
/// `--variant sqnxt_23_2x` works as well as the canonical spelling.
impl FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|v| v.name()).collect();
                format!("unknown variant '{s}', expected one of: {}", known.join(", "))
            })
    }
}
