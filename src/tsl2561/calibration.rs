// Manufacturer lux approximation coefficients.
//
// Ratio bounds are channel1/channel0 scaled by 2^RATIO_SCALE, the b and m
// coefficients are scaled by 2^LUX_SCALE.

use super::state::Package;

pub const LUX_SCALE: u32 = 14;
pub const RATIO_SCALE: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub ratio_bound: u32,
    pub b: u32,
    pub m: u32,
}

/// What to use when the ratio is above every bound in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    LastSegment,
    Zero,
}

#[derive(Debug)]
pub struct CalibrationTable {
    pub segments: [Segment; 8],
    pub overflow: Overflow,
}

const fn seg(ratio_bound: u32, b: u32, m: u32) -> Segment {
    Segment { ratio_bound, b, m }
}

/// T, FN and CL packages.
pub static T_FN_CL: CalibrationTable = CalibrationTable {
    segments: [
        seg(0x0040, 0x01f2, 0x01be), // 0.125: 0.0304, 0.0272
        seg(0x0080, 0x0214, 0x02d1), // 0.250: 0.0325, 0.0440
        seg(0x00c0, 0x023f, 0x037b), // 0.375: 0.0351, 0.0544
        seg(0x0100, 0x0270, 0x03fe), // 0.50: 0.0381, 0.0624
        seg(0x0138, 0x016f, 0x01fc), // 0.61: 0.0224, 0.0310
        seg(0x019a, 0x00d2, 0x00fb), // 0.80: 0.0128, 0.0153
        seg(0x029a, 0x0018, 0x0012), // 1.3: 0.00146, 0.00112
        seg(0x029a, 0x0000, 0x0000),
    ],
    overflow: Overflow::LastSegment,
};

/// CS package.
///
/// Above the last bound this table yields zero coefficients, not its last
/// segment. Keep the two fallbacks distinct until verified on hardware.
pub static CS: CalibrationTable = CalibrationTable {
    segments: [
        seg(0x0043, 0x0204, 0x01ad), // 0.130: 0.0315, 0.0262
        seg(0x0085, 0x0228, 0x02c1), // 0.260: 0.0337, 0.0430
        seg(0x00c8, 0x0253, 0x0363), // 0.390: 0.0363, 0.0529
        seg(0x010a, 0x0282, 0x03df), // 0.520: 0.0392, 0.0605
        seg(0x014d, 0x0177, 0x01dd), // 0.65: 0.0229, 0.0291
        seg(0x019a, 0x0101, 0x0127), // 0.80: 0.0157, 0.0180
        seg(0x029a, 0x0037, 0x002b), // 1.3: 0.00338, 0.00260
        seg(0x029a, 0x0000, 0x0000),
    ],
    overflow: Overflow::Zero,
};

impl CalibrationTable {
    pub fn for_package(package: Package) -> &'static CalibrationTable {
        match package {
            Package::Cs => &CS,
            Package::TFnCl => &T_FN_CL,
        }
    }

    /// Index of the first segment whose bound is at or above `ratio`.
    pub fn position(&self, ratio: u32) -> Option<usize> {
        self.segments.iter().position(|s| ratio <= s.ratio_bound)
    }

    /// The (b, m) pair for a rounded channel ratio.
    pub fn coefficients(&self, ratio: u32) -> (u32, u32) {
        match self.position(ratio) {
            Some(i) => (self.segments[i].b, self.segments[i].m),
            None => match self.overflow {
                Overflow::LastSegment => {
                    let last = &self.segments[self.segments.len() - 1];
                    (last.b, last.m)
                }
                Overflow::Zero => (0, 0),
            },
        }
    }
}
