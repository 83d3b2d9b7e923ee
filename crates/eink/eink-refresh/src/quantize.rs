//! Gray quantization and 4bpp packing
//!
//! Captured frames carry one byte of gray per pixel. The IT8951 loads 4 bits
//! per pixel, two pixels per byte with the left pixel in the low nibble. A
//! full-level write keeps all sixteen levels; a few-level write snaps every
//! pixel to a four-entry palette so the fast waveforms render it without
//! ghosting.
//!
//! | nibble  | few-level |
//! |---------|-----------|
//! | 0x0-0x4 | 0x0       |
//! | 0x5-0x9 | 0x6       |
//! | 0xA-0xE | 0xA       |
//! | 0xF     | 0xF       |

use eink_specs::{LevelHint, WaveformMode};
use platform::{Frame, Rect};

use crate::ContractViolation;

/// Gray nibbles the few-level waveforms render cleanly
pub const FEW_LEVEL_PALETTE: [u8; 4] = [0x0, 0x6, 0xA, 0xF];

/// Nibble to few-level palette entry, bucketed by `nibble / 5`
const FEW_LEVEL_SNAP: [u8; 16] = [
    0x0, 0x0, 0x0, 0x0, 0x0, //
    0x6, 0x6, 0x6, 0x6, 0x6, //
    0xA, 0xA, 0xA, 0xA, 0xA, //
    0xF,
];

/// Snap a 4-bit gray to the few-level palette
///
/// Palette entries map to themselves.
pub fn snap_few_level(nibble: u8) -> u8 {
    FEW_LEVEL_SNAP
        .get(usize::from(nibble & 0x0F))
        .copied()
        .unwrap_or(0x0F)
}

/// True if the 4-bit gray is a few-level palette entry
pub fn is_few_level_nibble(nibble: u8) -> bool {
    FEW_LEVEL_PALETTE.contains(&nibble)
}

/// True if every pixel already renders cleanly with four levels
///
/// Only the high nibble of each byte counts. An empty buffer qualifies.
// SAFETY: u8 >> 4 cannot overflow.
#[allow(clippy::arithmetic_side_effects)]
pub fn classify_as_few_level(pixels: &[u8]) -> bool {
    pixels.iter().all(|&p| is_few_level_nibble(p >> 4))
}

/// Pack 8-bit grays into 4bpp at the given fidelity
///
/// Output is exactly half the input length.
///
/// # Examples
/// ```
/// # use eink_refresh::quantize::pack;
/// # use eink_specs::LevelHint;
/// let packed = pack(&[0xF0, 0x00, 0xA0, 0x60], LevelHint::FewLevel).unwrap();
/// assert_eq!(packed, vec![0x0F, 0x6A]);
/// ```
// SAFETY: nibbles are <= 0xF, so `n << 4` fits in a u8.
#[allow(clippy::arithmetic_side_effects)]
pub fn pack(pixels: &[u8], level: LevelHint) -> Result<Vec<u8>, ContractViolation> {
    if pixels.len() & 1 != 0 {
        return Err(ContractViolation::OddLength(pixels.len()));
    }
    let nibble: fn(u8) -> u8 = match level {
        LevelHint::FullLevel => |p| p >> 4,
        LevelHint::FewLevel => |p| snap_few_level(p >> 4),
    };
    Ok(pixels
        .chunks_exact(2)
        .map(|pair| match *pair {
            [first, second] => nibble(first) | (nibble(second) << 4),
            _ => 0,
        })
        .collect())
}

/// Expand 4bpp data back to one byte per pixel
///
/// Each nibble `n` becomes `n * 0x11`, so `0xF` reads back as white `0xFF`.
// SAFETY: 0xF * 0x11 = 0xFF, fits in a u8.
#[allow(clippy::arithmetic_side_effects)]
pub fn unpack(packed: &[u8]) -> Vec<u8> {
    packed
        .iter()
        .flat_map(|&b| [(b & 0x0F) * 0x11, (b >> 4) * 0x11])
        .collect()
}

/// Frame ready for a panel write
///
/// Building one consumes the captured [`Frame`]; the 8-bit buffer is gone
/// before the write starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedFrame {
    packed: Vec<u8>,
    rect: Rect,
    level: LevelHint,
    waveform: Option<WaveformMode>,
}

impl QuantizedFrame {
    /// Quantize a captured frame
    pub fn new(
        frame: Frame,
        level: LevelHint,
        waveform: Option<WaveformMode>,
    ) -> Result<Self, ContractViolation> {
        let rect = frame.rect();
        let packed = pack(&frame.into_pixels(), level)?;
        Ok(Self {
            packed,
            rect,
            level,
            waveform,
        })
    }

    /// Packed 4bpp bytes
    pub fn packed(&self) -> &[u8] {
        &self.packed
    }

    /// Target area on the panel
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Fidelity the pixels were quantized at
    pub fn level(&self) -> LevelHint {
        self.level
    }

    /// Waveform to request, `None` for the controller default
    pub fn waveform(&self) -> Option<WaveformMode> {
        self.waveform
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_table() {
        assert_eq!(snap_few_level(0x0), 0x0);
        assert_eq!(snap_few_level(0x4), 0x0);
        assert_eq!(snap_few_level(0x5), 0x6);
        assert_eq!(snap_few_level(0x6), 0x6);
        assert_eq!(snap_few_level(0x9), 0x6);
        assert_eq!(snap_few_level(0xA), 0xA);
        assert_eq!(snap_few_level(0xE), 0xA);
        assert_eq!(snap_few_level(0xF), 0xF);
    }

    #[test]
    fn test_palette_is_fixed_point() {
        for p in FEW_LEVEL_PALETTE {
            assert_eq!(snap_few_level(p), p);
        }
    }

    #[test]
    fn test_pack_few_level_scenario() {
        let packed = pack(&[0xF0, 0x00, 0xA0, 0x60], LevelHint::FewLevel).unwrap();
        assert_eq!(packed, vec![0x0F, 0x6A]);
    }

    #[test]
    fn test_pack_full_level_keeps_high_nibble() {
        let packed = pack(&[0x1F, 0xE2, 0x73, 0x84], LevelHint::FullLevel).unwrap();
        assert_eq!(packed, vec![0xE1, 0x87]);
    }

    #[test]
    fn test_pack_rejects_odd_length() {
        assert_eq!(
            pack(&[0, 0, 0], LevelHint::FullLevel),
            Err(ContractViolation::OddLength(3))
        );
    }

    #[test]
    fn test_pack_empty() {
        assert_eq!(pack(&[], LevelHint::FewLevel), Ok(vec![]));
    }

    #[test]
    fn test_classify() {
        assert!(classify_as_few_level(&[0x00, 0x6F, 0xA0, 0xFF]));
        assert!(!classify_as_few_level(&[0x00, 0x50]));
        assert!(classify_as_few_level(&[]));
    }

    #[test]
    fn test_unpack() {
        assert_eq!(unpack(&[0x0F, 0x6A]), vec![0xFF, 0x00, 0xAA, 0x66]);
    }

    #[test]
    fn test_quantized_frame_from_capture() {
        let rect = Rect::new(0, 0, 2, 1).unwrap();
        let frame = Frame::new(vec![0xFF, 0x00], rect).unwrap();
        let q = QuantizedFrame::new(frame, LevelHint::FewLevel, Some(WaveformMode::DU4)).unwrap();
        assert_eq!(q.packed(), &[0x0F]);
        assert_eq!(q.rect(), rect);
        assert_eq!(q.level(), LevelHint::FewLevel);
        assert_eq!(q.waveform(), Some(WaveformMode::DU4));
    }
}
