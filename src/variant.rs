//! Supported chip models and their static descriptors.

use crate::config::{DataRate, FullScaleRange};
use crate::registers::{Layout, COMMAND_LAYOUT, REGISTER_LAYOUT};

/// A supported chip model.
///
/// The discriminants are the numeric tags accepted by [`Variant::try_from`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Variant {
    Ads1013 = 1,
    Ads1014,
    Ads1015,
    Ads1113,
    Ads1114,
    Ads1115,
    Ads1119,
    Ads1219,
}

/// A numeric tag that does not name any [`Variant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownVariant(pub u8);

impl TryFrom<u8> for Variant {
    type Error = UnknownVariant;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Variant::Ads1013),
            2 => Ok(Variant::Ads1014),
            3 => Ok(Variant::Ads1015),
            4 => Ok(Variant::Ads1113),
            5 => Ok(Variant::Ads1114),
            6 => Ok(Variant::Ads1115),
            7 => Ok(Variant::Ads1119),
            8 => Ok(Variant::Ads1219),
            other => Err(UnknownVariant(other)),
        }
    }
}

/// Width of a conversion result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 12-bit result left-aligned in a 16-bit register.
    Bits12,
    Bits16,
    Bits24,
}

impl Resolution {
    /// Number of bytes the result register delivers.
    pub const fn bytes(self) -> usize {
        match self {
            Resolution::Bits12 | Resolution::Bits16 => 2,
            Resolution::Bits24 => 3,
        }
    }
}

/// How the bus is framed for a variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// Register pointer byte followed by 16-bit big-endian data. Writing the
    /// config register with the start bit set triggers a conversion.
    RegisterPointer,
    /// Single command bytes (RESET, START, RDATA, RREG, WREG) and an 8-bit
    /// config register. Conversions need an explicit START.
    Command,
}

/// How the end of a conversion is detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Wait a fixed time after the trigger.
    Delay { micros: u32 },
    /// Wait a time that depends on the programmed data rate.
    RateDelay,
    /// Poll the active-low DRDY pin, or the status register without one.
    ReadyPoll,
}

/// Fixed-code to logical-value table for one configuration field.
#[derive(Clone, Copy, Debug)]
pub struct RateTable {
    /// Rates in ascending order, indexed by register code.
    pub rates: &'static [DataRate],
    /// The concrete rate `DataRate::Default` resolves to.
    pub default: DataRate,
}

/// A legal differential input pair and the mux code that selects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffPair {
    pub positive: u8,
    pub negative: u8,
    pub code: u8,
}

/// Channel numbering of a variant's input multiplexer.
#[derive(Clone, Copy, Debug)]
pub struct MuxTable {
    /// Mux code of single-ended channel 0. Channel `n` is `base + n`.
    pub single_ended_base: u8,
    pub differential: &'static [DiffPair],
}

/// Everything that differs between variants, as plain data.
#[derive(Debug)]
pub struct Descriptor {
    pub variant: Variant,
    pub name: &'static str,
    pub channels: u8,
    pub resolution: Resolution,
    pub protocol: Protocol,
    /// The full-scale range, if the chip has a single fixed reference.
    pub fixed_fsr: Option<FullScaleRange>,
    pub continuous: bool,
    pub rates: RateTable,
    pub mux: MuxTable,
    pub completion: Completion,
    pub(crate) layout: Layout,
}

impl Descriptor {
    /// Whether the chip signals completion itself instead of relying on a delay.
    pub const fn is_poll_based(&self) -> bool {
        matches!(self.completion, Completion::ReadyPoll)
    }

    pub const fn has_gain(&self) -> bool {
        self.layout.gain.is_some()
    }

    pub const fn has_voltage_reference(&self) -> bool {
        self.layout.vref.is_some()
    }
}

const ADS101X_RATES: RateTable = RateTable {
    rates: &[
        DataRate::Sps128,
        DataRate::Sps250,
        DataRate::Sps490,
        DataRate::Sps920,
        DataRate::Sps1600,
        DataRate::Sps2400,
        DataRate::Sps3300,
    ],
    default: DataRate::Sps1600,
};

const ADS111X_RATES: RateTable = RateTable {
    rates: &[
        DataRate::Sps8,
        DataRate::Sps16,
        DataRate::Sps32,
        DataRate::Sps64,
        DataRate::Sps128,
        DataRate::Sps250,
        DataRate::Sps475,
        DataRate::Sps860,
    ],
    default: DataRate::Sps128,
};

const ADS1X19_RATES: RateTable = RateTable {
    rates: &[
        DataRate::Sps20,
        DataRate::Sps90,
        DataRate::Sps330,
        DataRate::Sps1000,
    ],
    default: DataRate::Sps20,
};

const SINGLE_INPUT_MUX: MuxTable = MuxTable {
    single_ended_base: 4,
    differential: &[DiffPair {
        positive: 0,
        negative: 1,
        code: 0,
    }],
};

const ADS1X15_MUX: MuxTable = MuxTable {
    single_ended_base: 4,
    differential: &[
        DiffPair {
            positive: 0,
            negative: 1,
            code: 0,
        },
        DiffPair {
            positive: 0,
            negative: 3,
            code: 1,
        },
        DiffPair {
            positive: 1,
            negative: 3,
            code: 2,
        },
        DiffPair {
            positive: 2,
            negative: 3,
            code: 3,
        },
    ],
};

const ADS1X19_MUX: MuxTable = MuxTable {
    single_ended_base: 3,
    differential: &[
        DiffPair {
            positive: 0,
            negative: 1,
            code: 0,
        },
        DiffPair {
            positive: 2,
            negative: 3,
            code: 1,
        },
        DiffPair {
            positive: 1,
            negative: 2,
            code: 2,
        },
    ],
};

/// ADS101x conversions take at most 1 ms.
const ADS101X_DELAY: Completion = Completion::Delay { micros: 1_000 };
/// ADS111x conversions take at most 8 ms.
const ADS111X_DELAY: Completion = Completion::Delay { micros: 8_000 };

static DESCRIPTORS: [Descriptor; 8] = [
    Descriptor {
        variant: Variant::Ads1013,
        name: "ADS1013",
        channels: 1,
        resolution: Resolution::Bits12,
        protocol: Protocol::RegisterPointer,
        fixed_fsr: Some(FullScaleRange::Fsr2_048),
        continuous: false,
        rates: ADS101X_RATES,
        mux: SINGLE_INPUT_MUX,
        completion: ADS101X_DELAY,
        layout: REGISTER_LAYOUT,
    },
    Descriptor {
        variant: Variant::Ads1014,
        name: "ADS1014",
        channels: 1,
        resolution: Resolution::Bits12,
        protocol: Protocol::RegisterPointer,
        fixed_fsr: None,
        continuous: false,
        rates: ADS101X_RATES,
        mux: SINGLE_INPUT_MUX,
        completion: ADS101X_DELAY,
        layout: REGISTER_LAYOUT,
    },
    Descriptor {
        variant: Variant::Ads1015,
        name: "ADS1015",
        channels: 4,
        resolution: Resolution::Bits12,
        protocol: Protocol::RegisterPointer,
        fixed_fsr: None,
        continuous: false,
        rates: ADS101X_RATES,
        mux: ADS1X15_MUX,
        completion: ADS101X_DELAY,
        layout: REGISTER_LAYOUT,
    },
    Descriptor {
        variant: Variant::Ads1113,
        name: "ADS1113",
        channels: 1,
        resolution: Resolution::Bits16,
        protocol: Protocol::RegisterPointer,
        fixed_fsr: Some(FullScaleRange::Fsr2_048),
        continuous: false,
        rates: ADS111X_RATES,
        mux: SINGLE_INPUT_MUX,
        completion: ADS111X_DELAY,
        layout: REGISTER_LAYOUT,
    },
    Descriptor {
        variant: Variant::Ads1114,
        name: "ADS1114",
        channels: 1,
        resolution: Resolution::Bits16,
        protocol: Protocol::RegisterPointer,
        fixed_fsr: None,
        continuous: false,
        rates: ADS111X_RATES,
        mux: SINGLE_INPUT_MUX,
        completion: ADS111X_DELAY,
        layout: REGISTER_LAYOUT,
    },
    Descriptor {
        variant: Variant::Ads1115,
        name: "ADS1115",
        channels: 4,
        resolution: Resolution::Bits16,
        protocol: Protocol::RegisterPointer,
        fixed_fsr: None,
        continuous: false,
        rates: ADS111X_RATES,
        mux: ADS1X15_MUX,
        completion: ADS111X_DELAY,
        layout: REGISTER_LAYOUT,
    },
    Descriptor {
        variant: Variant::Ads1119,
        name: "ADS1119",
        channels: 4,
        resolution: Resolution::Bits16,
        protocol: Protocol::Command,
        fixed_fsr: Some(FullScaleRange::Fsr2_048),
        continuous: true,
        rates: ADS1X19_RATES,
        mux: ADS1X19_MUX,
        completion: Completion::RateDelay,
        layout: COMMAND_LAYOUT,
    },
    Descriptor {
        variant: Variant::Ads1219,
        name: "ADS1219",
        channels: 4,
        resolution: Resolution::Bits24,
        protocol: Protocol::Command,
        fixed_fsr: Some(FullScaleRange::Fsr2_048),
        continuous: true,
        rates: ADS1X19_RATES,
        mux: ADS1X19_MUX,
        completion: Completion::ReadyPoll,
        layout: COMMAND_LAYOUT,
    },
];

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::Ads1013,
        Variant::Ads1014,
        Variant::Ads1015,
        Variant::Ads1113,
        Variant::Ads1114,
        Variant::Ads1115,
        Variant::Ads1119,
        Variant::Ads1219,
    ];

    /// The static descriptor of this variant.
    pub fn descriptor(self) -> &'static Descriptor {
        &DESCRIPTORS[self as usize - 1]
    }

    pub fn channels(self) -> u8 {
        self.descriptor().channels
    }

    pub fn resolution(self) -> Resolution {
        self.descriptor().resolution
    }
}
