//! Input channel selection and the multiplexer codes behind it.

use crate::variant::Variant;

/// A channel pair the variant cannot route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannelPair;

/// A positive input and an optional negative input.
///
/// Without a negative input the positive one is measured against ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelPair {
    pub positive: u8,
    pub negative: Option<u8>,
}

impl ChannelPair {
    pub const fn single_ended(channel: u8) -> Self {
        Self {
            positive: channel,
            negative: None,
        }
    }

    pub const fn differential(positive: u8, negative: u8) -> Self {
        Self {
            positive,
            negative: Some(negative),
        }
    }

    pub const fn is_single_ended(&self) -> bool {
        self.negative.is_none()
    }
}

/// Resolves a channel pair to the variant's mux code.
///
/// Single-ended channels must exist on the variant. Differential pairs must
/// appear in the variant's fixed pair table, in the listed orientation.
pub fn resolve_mux(variant: Variant, pair: ChannelPair) -> Result<u8, InvalidChannelPair> {
    let desc = variant.descriptor();
    match pair.negative {
        None if pair.positive < desc.channels => Ok(desc.mux.single_ended_base + pair.positive),
        None => Err(InvalidChannelPair),
        Some(negative) => desc
            .mux
            .differential
            .iter()
            .find(|diff| diff.positive == pair.positive && diff.negative == negative)
            .map(|diff| diff.code)
            .ok_or(InvalidChannelPair),
    }
}

/// Maps a mux code read back from the chip to the channel pair it selects.
pub fn resolve_channels(variant: Variant, code: u8) -> Result<ChannelPair, InvalidChannelPair> {
    let desc = variant.descriptor();
    let base = desc.mux.single_ended_base;
    if (base..base + desc.channels).contains(&code) {
        return Ok(ChannelPair::single_ended(code - base));
    }
    desc.mux
        .differential
        .iter()
        .find(|diff| diff.code == code)
        .map(|diff| ChannelPair::differential(diff.positive, diff.negative))
        .ok_or(InvalidChannelPair)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_pairs() -> impl Iterator<Item = ChannelPair> {
        (0..6u8).flat_map(|p| {
            core::iter::once(ChannelPair::single_ended(p))
                .chain((0..6u8).map(move |n| ChannelPair::differential(p, n)))
        })
    }

    #[test]
    fn legal_pairs_resolve_back() {
        for variant in Variant::ALL {
            for pair in all_pairs() {
                if let Ok(code) = resolve_mux(variant, pair) {
                    assert_eq!(resolve_channels(variant, code), Ok(pair), "{variant:?}");
                }
            }
        }
    }

    #[test]
    fn ads1x15_pairs() {
        let legal = [(0, 1, 0), (0, 3, 1), (1, 3, 2), (2, 3, 3)];
        for variant in [Variant::Ads1015, Variant::Ads1115] {
            for pair in all_pairs().filter(|pair| !pair.is_single_ended()) {
                let expected = legal
                    .iter()
                    .find(|&&(p, n, _)| Some(n) == pair.negative && p == pair.positive)
                    .map(|&(_, _, code)| code)
                    .ok_or(InvalidChannelPair);
                assert_eq!(resolve_mux(variant, pair), expected);
            }
            assert_eq!(
                resolve_mux(variant, ChannelPair::differential(2, 1)),
                Err(InvalidChannelPair)
            );
        }
    }

    #[test]
    fn single_ended_numbering_differs_per_family() {
        for channel in 0..4 {
            assert_eq!(
                resolve_mux(Variant::Ads1115, ChannelPair::single_ended(channel)),
                Ok(4 + channel)
            );
            assert_eq!(
                resolve_mux(Variant::Ads1119, ChannelPair::single_ended(channel)),
                Ok(3 + channel)
            );
        }
        assert_eq!(
            resolve_mux(Variant::Ads1119, ChannelPair::single_ended(4)),
            Err(InvalidChannelPair)
        );
    }

    #[test]
    fn ads1x19_pairs() {
        assert_eq!(resolve_mux(Variant::Ads1219, ChannelPair::differential(0, 1)), Ok(0));
        assert_eq!(resolve_mux(Variant::Ads1219, ChannelPair::differential(2, 3)), Ok(1));
        assert_eq!(resolve_mux(Variant::Ads1219, ChannelPair::differential(1, 2)), Ok(2));
        assert_eq!(
            resolve_mux(Variant::Ads1219, ChannelPair::differential(0, 3)),
            Err(InvalidChannelPair)
        );
        // AVDD/2 short has no channel pair.
        assert_eq!(resolve_channels(Variant::Ads1119, 7), Err(InvalidChannelPair));
    }

    #[test]
    fn single_input_variants() {
        for variant in [Variant::Ads1013, Variant::Ads1114] {
            assert_eq!(resolve_mux(variant, ChannelPair::single_ended(0)), Ok(4));
            assert_eq!(resolve_mux(variant, ChannelPair::differential(0, 1)), Ok(0));
            assert_eq!(
                resolve_mux(variant, ChannelPair::single_ended(1)),
                Err(InvalidChannelPair)
            );
            assert_eq!(
                resolve_mux(variant, ChannelPair::differential(1, 0)),
                Err(InvalidChannelPair)
            );
            assert_eq!(resolve_channels(variant, 5), Err(InvalidChannelPair));
        }
    }
}
