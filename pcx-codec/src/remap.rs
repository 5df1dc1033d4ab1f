//! Component-count remapping.
//!
//! Decoded pixel buffers carry 3 or 4 channels, but callers may want 1-4.
//! The conversion table is fixed:
//!
//! - equal counts: byte-identical copy;
//! - reducing: keep the first `dst` channels per pixel, drop the rest;
//! - 1 channel expanding: replicate the value into every destination
//!   channel, alpha included;
//! - 2 channels expanding: copy channels 0 and 1, zero the third, alpha 255
//!   when present;
//! - 3 to 4: byte-reverse the first three channels (the source stores its
//!   components in reverse order relative to a conventional RGB triple) and
//!   set alpha to 255.
//!
//! Anything else is [`PcxError::UnsupportedRemap`]. Note that 3 -> 4
//! followed by 4 -> 3 does not restore the original channel order; the
//! expansion reverses, the reduction does not.

use crate::error::PcxError;
use crate::try_zeroed;

/// Convert a pixel buffer between channel layouts.
///
/// `src.len()` must be a whole number of `src_components`-sized pixels.
pub fn remap(src: &[u8], src_components: u8, dst_components: u8) -> Result<Vec<u8>, PcxError> {
    if !(1..=4).contains(&src_components) || !(1..=4).contains(&dst_components) {
        return Err(PcxError::UnsupportedRemap {
            from: src_components,
            to: dst_components,
        });
    }

    let sc = src_components as usize;
    let dc = dst_components as usize;
    debug_assert_eq!(src.len() % sc, 0);
    let pixel_count = src.len() / sc;

    let mut dst = try_zeroed(pixel_count * dc)?;

    if dc == sc {
        dst.copy_from_slice(src);
    } else if dc < sc {
        for (s, d) in src.chunks_exact(sc).zip(dst.chunks_exact_mut(dc)) {
            d.copy_from_slice(&s[..dc]);
        }
    } else {
        match sc {
            1 => {
                for (s, d) in src.chunks_exact(sc).zip(dst.chunks_exact_mut(dc)) {
                    d.fill(s[0]);
                }
            }
            2 => {
                for (s, d) in src.chunks_exact(sc).zip(dst.chunks_exact_mut(dc)) {
                    d[0] = s[0];
                    d[1] = s[1];
                    d[2] = 0x00;
                    if dc == 4 {
                        d[3] = 0xFF;
                    }
                }
            }
            3 => {
                // dc > sc and dc <= 4, so this is exactly 3 -> 4.
                for (s, d) in src.chunks_exact(sc).zip(dst.chunks_exact_mut(dc)) {
                    d[0] = s[2];
                    d[1] = s[1];
                    d[2] = s[0];
                    d[3] = 0xFF;
                }
            }
            _ => {
                return Err(PcxError::UnsupportedRemap {
                    from: src_components,
                    to: dst_components,
                });
            }
        }
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_count_is_identity() {
        let src = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(remap(&src, 3, 3).unwrap(), src);
    }

    #[test]
    fn test_reduce_keeps_leading_channels() {
        let src = vec![1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(remap(&src, 4, 3).unwrap(), vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(remap(&src, 4, 1).unwrap(), vec![1, 5]);
    }

    #[test]
    fn test_expand_gray_replicates_into_alpha() {
        let src = vec![9, 200];
        assert_eq!(remap(&src, 1, 3).unwrap(), vec![9, 9, 9, 200, 200, 200]);
        // The single value lands in every channel, alpha included.
        assert_eq!(
            remap(&src, 1, 4).unwrap(),
            vec![9, 9, 9, 9, 200, 200, 200, 200]
        );
    }

    #[test]
    fn test_expand_two_channels() {
        let src = vec![1, 2];
        assert_eq!(remap(&src, 2, 3).unwrap(), vec![1, 2, 0]);
        assert_eq!(remap(&src, 2, 4).unwrap(), vec![1, 2, 0, 0xFF]);
    }

    #[test]
    fn test_expand_three_to_four_reverses_and_sets_alpha() {
        let src = vec![1, 2, 3, 10, 20, 30];
        assert_eq!(
            remap(&src, 3, 4).unwrap(),
            vec![3, 2, 1, 0xFF, 30, 20, 10, 0xFF]
        );
    }

    #[test]
    fn test_round_trip_asymmetry() {
        // 3 -> 4 reverses channel order; 4 -> 3 does not reverse back.
        let src = vec![1, 2, 3];
        let expanded = remap(&src, 3, 4).unwrap();
        let reduced = remap(&expanded, 4, 3).unwrap();
        assert_eq!(reduced, vec![3, 2, 1]);
        assert_ne!(reduced, src);
    }

    #[test]
    fn test_out_of_range_counts_rejected() {
        let err = remap(&[0u8; 4], 0, 3).unwrap_err();
        assert!(matches!(
            err,
            PcxError::UnsupportedRemap { from: 0, to: 3 }
        ));

        let err = remap(&[0u8; 4], 4, 5).unwrap_err();
        assert!(matches!(
            err,
            PcxError::UnsupportedRemap { from: 4, to: 5 }
        ));
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(remap(&[], 3, 4).unwrap(), Vec::<u8>::new());
    }
}
