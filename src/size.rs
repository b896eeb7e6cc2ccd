//! Human-readable byte counts on a decimal (base-1000) scale.

/// Units used by [`format_size`]. The scale stops at gigabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
}

impl SizeUnit {
    const LADDER: [SizeUnit; 4] = [SizeUnit::B, SizeUnit::KB, SizeUnit::MB, SizeUnit::GB];

    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
        }
    }

    /// Number of bytes in one of this unit.
    pub fn divisor(self) -> u64 {
        1000u64.pow(self as u32)
    }

    /// Largest unit whose divisor does not exceed `bytes`, capped at GB.
    pub fn for_bytes(bytes: u64) -> Self {
        Self::LADDER
            .into_iter()
            .rev()
            .find(|unit| bytes >= unit.divisor())
            .unwrap_or(SizeUnit::B)
    }
}

/// Format a byte count as `"<value> <unit>"`, rounded to one decimal place.
///
/// Rounding is half away from zero and done on integers, so large counts do
/// not drift. Whole values print without a fraction (`"1 KB"`, not `"1.0 KB"`).
/// Anything at or above 1000 GB is still reported in GB.
pub fn format_size(bytes: u64) -> String {
    let unit = SizeUnit::for_bytes(bytes);
    let divisor = u128::from(unit.divisor());
    let tenths = (u128::from(bytes) * 10 + divisor / 2) / divisor;

    let whole = tenths / 10;
    let fraction = tenths % 10;
    if fraction == 0 {
        format!("{} {}", whole, unit.as_str())
    } else {
        format!("{}.{} {}", whole, fraction, unit.as_str())
    }
}
