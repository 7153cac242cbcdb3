//! Logical configuration values and their per-variant register encoding.
//!
//! Every `encode_*` function maps a logical value onto the bit pattern of the
//! matching configuration field, and every `decode_*` function maps a field
//! value back. Nothing here touches the bus.

use crate::channel::ChannelPair;
use crate::variant::{Protocol, Variant};

/// A logical value the variant cannot represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedSetting;

/// Full-scale input range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FullScaleRange {
    /// ±6.144V
    Fsr6_144,
    /// ±4.096V
    Fsr4_096,
    /// ±2.048V
    #[default]
    Fsr2_048,
    /// ±1.024V
    Fsr1_024,
    /// ±0.512V
    Fsr0_512,
    /// ±0.256V
    Fsr0_256,
    /// Narrowest range, ±0.256V.
    Min,
    /// Widest range, ±6.144V.
    Max,
    /// ±2.048V
    Default,
}

impl FullScaleRange {
    /// Resolves the symbolic aliases to a concrete range.
    pub const fn resolve(self) -> Self {
        match self {
            FullScaleRange::Min => FullScaleRange::Fsr0_256,
            FullScaleRange::Max => FullScaleRange::Fsr6_144,
            FullScaleRange::Default => FullScaleRange::Fsr2_048,
            other => other,
        }
    }
}

/// Conversion rate in samples per second.
///
/// Each sub-family supports its own subset; `Min`, `Max` and `Default`
/// resolve per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    Sps8,
    Sps16,
    Sps20,
    Sps32,
    Sps64,
    Sps90,
    Sps128,
    Sps250,
    Sps330,
    Sps475,
    Sps490,
    Sps860,
    Sps920,
    Sps1000,
    Sps1600,
    Sps2400,
    Sps3300,
    Min,
    Max,
    Default,
}

impl DataRate {
    /// Resolves the symbolic aliases against the variant's rate table.
    pub fn resolve(self, variant: Variant) -> Self {
        let table = &variant.descriptor().rates;
        match self {
            DataRate::Min => table.rates[0],
            DataRate::Max => table.rates[table.rates.len() - 1],
            DataRate::Default => table.default,
            other => other,
        }
    }

    /// Samples per second, or `None` for an unresolved alias.
    pub const fn sps(self) -> Option<u16> {
        let sps = match self {
            DataRate::Sps8 => 8,
            DataRate::Sps16 => 16,
            DataRate::Sps20 => 20,
            DataRate::Sps32 => 32,
            DataRate::Sps64 => 64,
            DataRate::Sps90 => 90,
            DataRate::Sps128 => 128,
            DataRate::Sps250 => 250,
            DataRate::Sps330 => 330,
            DataRate::Sps475 => 475,
            DataRate::Sps490 => 490,
            DataRate::Sps860 => 860,
            DataRate::Sps920 => 920,
            DataRate::Sps1000 => 1000,
            DataRate::Sps1600 => 1600,
            DataRate::Sps2400 => 2400,
            DataRate::Sps3300 => 3300,
            DataRate::Min | DataRate::Max | DataRate::Default => return None,
        };
        Some(sps)
    }
}

/// Programmable gain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    #[default]
    X1,
    X4,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionMode {
    #[default]
    SingleShot,
    Continuous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageReference {
    /// Internal 2.048V reference.
    #[default]
    Internal,
    External,
}

/// A complete logical configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub fsr: FullScaleRange,
    pub rate: DataRate,
    pub gain: Gain,
    pub mode: ConversionMode,
    pub vref: VoltageReference,
    pub channel: ChannelPair,
}

impl Settings {
    /// The configuration a variant wakes up with after a reset.
    pub fn for_variant(variant: Variant) -> Self {
        let desc = variant.descriptor();
        Self {
            fsr: desc.fixed_fsr.unwrap_or_default(),
            rate: desc.rates.default,
            gain: Gain::X1,
            mode: ConversionMode::SingleShot,
            vref: VoltageReference::Internal,
            channel: ChannelPair::differential(0, 1),
        }
    }
}

const FSR_CODES: [FullScaleRange; 6] = [
    FullScaleRange::Fsr6_144,
    FullScaleRange::Fsr4_096,
    FullScaleRange::Fsr2_048,
    FullScaleRange::Fsr1_024,
    FullScaleRange::Fsr0_512,
    FullScaleRange::Fsr0_256,
];

pub fn encode_fsr(variant: Variant, fsr: FullScaleRange) -> Result<u8, UnsupportedSetting> {
    let fsr = fsr.resolve();
    if let Some(fixed) = variant.descriptor().fixed_fsr {
        if fsr != fixed {
            return Err(UnsupportedSetting);
        }
    }
    FSR_CODES
        .iter()
        .position(|&candidate| candidate == fsr)
        .map(|code| code as u8)
        .ok_or(UnsupportedSetting)
}

pub fn decode_fsr(variant: Variant, code: u8) -> Result<FullScaleRange, UnsupportedSetting> {
    if let Some(fixed) = variant.descriptor().fixed_fsr {
        return Ok(fixed);
    }
    match code {
        0..=5 => Ok(FSR_CODES[code as usize]),
        // 0b110 and 0b111 both select the narrowest range.
        6 | 7 => Ok(FullScaleRange::Fsr0_256),
        _ => Err(UnsupportedSetting),
    }
}

pub fn encode_rate(variant: Variant, rate: DataRate) -> Result<u8, UnsupportedSetting> {
    let rate = rate.resolve(variant);
    variant
        .descriptor()
        .rates
        .rates
        .iter()
        .position(|&candidate| candidate == rate)
        .map(|code| code as u8)
        .ok_or(UnsupportedSetting)
}

pub fn decode_rate(variant: Variant, code: u8) -> Result<DataRate, UnsupportedSetting> {
    let desc = variant.descriptor();
    if code as u16 >= 1 << desc.layout.rate.width {
        return Err(UnsupportedSetting);
    }
    let rates = desc.rates.rates;
    // ADS101x: 0b111 also selects 3300 SPS.
    Ok(rates
        .get(code as usize)
        .copied()
        .unwrap_or(rates[rates.len() - 1]))
}

pub fn encode_gain(variant: Variant, gain: Gain) -> Result<u8, UnsupportedSetting> {
    if !variant.descriptor().has_gain() {
        return Err(UnsupportedSetting);
    }
    Ok(match gain {
        Gain::X1 => 0,
        Gain::X4 => 1,
    })
}

pub fn decode_gain(variant: Variant, code: u8) -> Result<Gain, UnsupportedSetting> {
    if !variant.descriptor().has_gain() {
        return Err(UnsupportedSetting);
    }
    match code {
        0 => Ok(Gain::X1),
        1 => Ok(Gain::X4),
        _ => Err(UnsupportedSetting),
    }
}

pub fn encode_mode(variant: Variant, mode: ConversionMode) -> Result<u8, UnsupportedSetting> {
    let desc = variant.descriptor();
    if mode == ConversionMode::Continuous && !desc.continuous {
        return Err(UnsupportedSetting);
    }
    match (desc.protocol, mode) {
        // MODE bit: 1 = power-down single-shot.
        (Protocol::RegisterPointer, ConversionMode::SingleShot) => Ok(1),
        (Protocol::RegisterPointer, ConversionMode::Continuous) => Ok(0),
        // CM bit: 1 = continuous.
        (Protocol::Command, ConversionMode::SingleShot) => Ok(0),
        (Protocol::Command, ConversionMode::Continuous) => Ok(1),
    }
}

pub fn decode_mode(variant: Variant, code: u8) -> Result<ConversionMode, UnsupportedSetting> {
    let desc = variant.descriptor();
    let mode = match (desc.protocol, code) {
        (Protocol::RegisterPointer, 0) | (Protocol::Command, 1) => ConversionMode::Continuous,
        (Protocol::RegisterPointer, 1) | (Protocol::Command, 0) => ConversionMode::SingleShot,
        _ => return Err(UnsupportedSetting),
    };
    if mode == ConversionMode::Continuous && !desc.continuous {
        return Err(UnsupportedSetting);
    }
    Ok(mode)
}

pub fn encode_vref(variant: Variant, vref: VoltageReference) -> Result<u8, UnsupportedSetting> {
    if !variant.descriptor().has_voltage_reference() {
        return Err(UnsupportedSetting);
    }
    Ok(match vref {
        VoltageReference::Internal => 0,
        VoltageReference::External => 1,
    })
}

pub fn decode_vref(variant: Variant, code: u8) -> Result<VoltageReference, UnsupportedSetting> {
    if !variant.descriptor().has_voltage_reference() {
        return Err(UnsupportedSetting);
    }
    match code {
        0 => Ok(VoltageReference::Internal),
        1 => Ok(VoltageReference::External),
        _ => Err(UnsupportedSetting),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FSR: [FullScaleRange; 9] = [
        FullScaleRange::Fsr6_144,
        FullScaleRange::Fsr4_096,
        FullScaleRange::Fsr2_048,
        FullScaleRange::Fsr1_024,
        FullScaleRange::Fsr0_512,
        FullScaleRange::Fsr0_256,
        FullScaleRange::Min,
        FullScaleRange::Max,
        FullScaleRange::Default,
    ];

    const ALL_RATES: [DataRate; 20] = [
        DataRate::Sps8,
        DataRate::Sps16,
        DataRate::Sps20,
        DataRate::Sps32,
        DataRate::Sps64,
        DataRate::Sps90,
        DataRate::Sps128,
        DataRate::Sps250,
        DataRate::Sps330,
        DataRate::Sps475,
        DataRate::Sps490,
        DataRate::Sps860,
        DataRate::Sps920,
        DataRate::Sps1000,
        DataRate::Sps1600,
        DataRate::Sps2400,
        DataRate::Sps3300,
        DataRate::Min,
        DataRate::Max,
        DataRate::Default,
    ];

    #[test]
    fn supported_values_survive_the_codec() {
        for variant in Variant::ALL {
            for fsr in ALL_FSR {
                if let Ok(code) = encode_fsr(variant, fsr) {
                    assert_eq!(decode_fsr(variant, code), Ok(fsr.resolve()));
                }
            }
            for rate in ALL_RATES {
                if let Ok(code) = encode_rate(variant, rate) {
                    assert_eq!(decode_rate(variant, code), Ok(rate.resolve(variant)));
                }
            }
            for gain in [Gain::X1, Gain::X4] {
                if let Ok(code) = encode_gain(variant, gain) {
                    assert_eq!(decode_gain(variant, code), Ok(gain));
                }
            }
            for mode in [ConversionMode::SingleShot, ConversionMode::Continuous] {
                if let Ok(code) = encode_mode(variant, mode) {
                    assert_eq!(decode_mode(variant, code), Ok(mode));
                }
            }
        }
    }

    #[test]
    fn fixed_reference_variants_only_accept_2v048() {
        for variant in [Variant::Ads1013, Variant::Ads1113, Variant::Ads1119] {
            assert_eq!(encode_fsr(variant, FullScaleRange::Fsr2_048), Ok(2));
            assert_eq!(encode_fsr(variant, FullScaleRange::Default), Ok(2));
            assert_eq!(
                encode_fsr(variant, FullScaleRange::Fsr4_096),
                Err(UnsupportedSetting)
            );
            assert_eq!(encode_fsr(variant, FullScaleRange::Max), Err(UnsupportedSetting));
        }
    }

    #[test]
    fn register_family_in_continuous_mode_is_not_decoded() {
        assert_eq!(decode_mode(Variant::Ads1115, 0), Err(UnsupportedSetting));
        assert_eq!(decode_mode(Variant::Ads1219, 1), Ok(ConversionMode::Continuous));
    }

    #[test]
    fn alias_values() {
        assert_eq!(FullScaleRange::Max.resolve(), FullScaleRange::Fsr6_144);
        assert_eq!(FullScaleRange::Default.resolve(), FullScaleRange::Fsr2_048);
        assert_eq!(DataRate::Max.resolve(Variant::Ads1015).sps(), Some(3300));
        assert_eq!(DataRate::Default.sps(), None);
    }

    #[test]
    fn fsr_aliases() {
        assert_eq!(encode_fsr(Variant::Ads1115, FullScaleRange::Max), Ok(0));
        assert_eq!(encode_fsr(Variant::Ads1115, FullScaleRange::Min), Ok(5));
        assert_eq!(
            decode_fsr(Variant::Ads1115, 7),
            Ok(FullScaleRange::Fsr0_256)
        );
    }

    #[test]
    fn rate_aliases_resolve_per_family() {
        assert_eq!(
            encode_rate(Variant::Ads1115, DataRate::Default),
            encode_rate(Variant::Ads1115, DataRate::Sps128)
        );
        assert_eq!(encode_rate(Variant::Ads1115, DataRate::Max), Ok(7));
        assert_eq!(encode_rate(Variant::Ads1015, DataRate::Default), Ok(4));
        assert_eq!(encode_rate(Variant::Ads1015, DataRate::Max), Ok(6));
        assert_eq!(encode_rate(Variant::Ads1119, DataRate::Default), Ok(0));
        assert_eq!(encode_rate(Variant::Ads1219, DataRate::Max), Ok(3));
        assert_eq!(decode_rate(Variant::Ads1015, 7), Ok(DataRate::Sps3300));
    }

    #[test]
    fn rates_from_another_family_are_rejected() {
        assert_eq!(
            encode_rate(Variant::Ads1115, DataRate::Sps3300),
            Err(UnsupportedSetting)
        );
        assert_eq!(
            encode_rate(Variant::Ads1015, DataRate::Sps8),
            Err(UnsupportedSetting)
        );
        assert_eq!(
            encode_rate(Variant::Ads1119, DataRate::Sps128),
            Err(UnsupportedSetting)
        );
        assert_eq!(decode_rate(Variant::Ads1119, 4), Err(UnsupportedSetting));
    }

    #[test]
    fn gain_vref_and_continuous_mode_need_the_command_family() {
        assert_eq!(encode_gain(Variant::Ads1115, Gain::X4), Err(UnsupportedSetting));
        assert_eq!(encode_gain(Variant::Ads1119, Gain::X4), Ok(1));
        assert_eq!(
            encode_vref(Variant::Ads1015, VoltageReference::External),
            Err(UnsupportedSetting)
        );
        assert_eq!(encode_vref(Variant::Ads1219, VoltageReference::External), Ok(1));
        assert_eq!(
            encode_mode(Variant::Ads1114, ConversionMode::Continuous),
            Err(UnsupportedSetting)
        );
        assert_eq!(encode_mode(Variant::Ads1114, ConversionMode::SingleShot), Ok(1));
        assert_eq!(encode_mode(Variant::Ads1119, ConversionMode::Continuous), Ok(1));
    }
}
