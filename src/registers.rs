#![allow(clippy::upper_case_acronyms)]

/// Register pointers of the ADS101x/ADS111x register-pointer family.
#[derive(Clone, Copy)]
#[repr(u8)]
pub(crate) enum Register {
    /// Conversion result register (16-bit, big-endian).
    Conversion = 0x00,
    /// Configuration register (16-bit, big-endian).
    Config = 0x01,
}

/// Commands of the ADS1119/ADS1219 command family.
#[derive(Clone, Copy)]
#[repr(u8)]
pub(crate) enum Command {
    /// Reset the device to its default configuration.
    Reset = 0x06,
    /// Start or restart a conversion.
    StartSync = 0x08,
    /// Read the last conversion result.
    RData = 0x10,
    /// Read the configuration register.
    RRegConfig = 0x20,
    /// Read the status register.
    RRegStatus = 0x24,
    /// Write the configuration register; followed by the new value.
    WReg = 0x40,
}

/// Value written to the register-family config register on reset.
pub(crate) const CONFIG_RESET: u16 = 0x8583;

/// DRDY flag in the command-family status register.
pub(crate) const STATUS_DRDY: u8 = 1 << 7;

/// A bit-field inside a register image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Field {
    pub offset: u8,
    pub width: u8,
}

impl Field {
    pub(crate) const fn new(offset: u8, width: u8) -> Self {
        Self { offset, width }
    }

    /// Mask of the field at its position in the register.
    pub(crate) const fn mask(&self) -> u16 {
        ((1u16 << self.width) - 1) << self.offset
    }

    /// Returns `image` with the field replaced by `value`.
    pub(crate) const fn insert(&self, image: u16, value: u8) -> u16 {
        (image & !self.mask()) | (((value as u16) << self.offset) & self.mask())
    }

    pub(crate) const fn extract(&self, image: u16) -> u8 {
        ((image & self.mask()) >> self.offset) as u8
    }
}

/// Bit-field positions of one protocol family's configuration register.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Layout {
    /// Input multiplexer.
    pub mux: Field,
    /// Programmable full-scale range, if the family has one.
    pub fsr: Option<Field>,
    pub rate: Field,
    /// Programmable gain, if the family has one.
    pub gain: Option<Field>,
    pub mode: Field,
    /// Voltage reference source, if the family has one.
    pub vref: Option<Field>,
    /// Writing a one here starts a conversion.
    pub start: Option<Field>,
}

/// ADS101x/ADS111x 16-bit config register.
///
/// ```text
/// 15 | 14:12 | 11:9 | 8    | 7:5 | 4:0
/// OS | MUX   | PGA  | MODE | DR  | COMP_*
/// ```
pub(crate) const REGISTER_LAYOUT: Layout = Layout {
    mux: Field::new(12, 3),
    fsr: Some(Field::new(9, 3)),
    rate: Field::new(5, 3),
    gain: None,
    mode: Field::new(8, 1),
    vref: None,
    start: Some(Field::new(15, 1)),
};

/// ADS1119/ADS1219 8-bit config register.
///
/// ```text
/// 7:5 | 4    | 3:2 | 1  | 0
/// MUX | GAIN | DR  | CM | VREF
/// ```
pub(crate) const COMMAND_LAYOUT: Layout = Layout {
    mux: Field::new(5, 3),
    fsr: None,
    rate: Field::new(2, 2),
    gain: Some(Field::new(4, 1)),
    mode: Field::new(1, 1),
    vref: Some(Field::new(0, 1)),
    start: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_insert_preserves_neighbours() {
        let mux = REGISTER_LAYOUT.mux;
        let image = mux.insert(CONFIG_RESET, 0b101);
        assert_eq!(image, 0xD583);
        assert_eq!(mux.extract(image), 0b101);
        assert_eq!(REGISTER_LAYOUT.rate.extract(image), 4);
    }

    #[test]
    fn field_insert_truncates_oversized_values() {
        let rate = COMMAND_LAYOUT.rate;
        assert_eq!(rate.insert(0, 0xFF), 0b0000_1100);
    }
}
