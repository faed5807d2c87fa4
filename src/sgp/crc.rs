//! # Configurable CRC Engine
//!
//! Checksum computation for SGP frames.
//!
//! The engine is parameterized over bit length (8/16/32), polynomial, seed,
//! final XOR and input/result reflection, so the link CRC can be matched to
//! whatever the peer's hardware unit is configured for. Two calculation
//! paths are provided: a bit-wise reference implementation and a table-driven
//! one derived from it. They produce identical checksums for every valid
//! configuration; the table path is the one the codec uses.
//!
//! **Default**: CRC-16, polynomial 0x1021 (x^12 + x^5 + x^0), zero seed,
//! zero final XOR, no reflection.

use thiserror::Error;

/// Errors raised while validating a [`CrcConfig`]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CrcError {
    /// Bit length other than 8, 16 or 32
    #[error("unsupported CRC bit length {0}, expected 8, 16 or 32")]
    LengthBad(u8),

    /// Zero polynomial generates nothing
    #[error("CRC polynomial must not be zero")]
    PolynomialZero,

    /// Polynomial wider than the configured bit length
    #[error("CRC polynomial 0x{0:X} does not fit in {1} bits")]
    PolynomialOversized(u32, u8),

    /// Initial value wider than the configured bit length
    #[error("CRC initial value 0x{0:X} does not fit in {1} bits")]
    InitValueOversized(u32, u8),

    /// Final XOR value wider than the configured bit length
    #[error("CRC final XOR value 0x{0:X} does not fit in {1} bits")]
    FinalXorOversized(u32, u8),
}

/// CRC algorithm parameters
///
/// All fields are validated together by [`CrcEngine::new`]; an invalid
/// combination yields a [`CrcError`] and no engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcConfig {
    /// Checksum width in bits (8, 16 or 32)
    pub bit_length: u8,

    /// Generator polynomial, without the implicit top bit
    pub polynomial: u32,

    /// Register seed value
    pub initial_value: u32,

    /// Value XORed into the final checksum
    pub final_xor_value: u32,

    /// Reflect each input byte before folding it in
    pub input_reflected: bool,

    /// Reflect the final checksum before the XOR step
    pub result_reflected: bool,
}

impl Default for CrcConfig {
    /// The link default: CRC-16/0x1021, zero seed, zero XOR, no reflection
    fn default() -> Self {
        Self {
            bit_length: 16,
            polynomial: (1 << 12) | (1 << 5) | 1,
            initial_value: 0,
            final_xor_value: 0,
            input_reflected: false,
            result_reflected: false,
        }
    }
}

/// CRC engine with a precomputed 256-entry lookup table
///
/// The table is owned exclusively by the engine, built once at construction
/// and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CrcEngine {
    config: CrcConfig,
    mask: u32,
    table: [u32; 256],
}

impl CrcEngine {
    /// Validate a configuration and build an engine from it
    ///
    /// # Errors
    ///
    /// Checks run in a fixed order and the first violation wins:
    /// bit length ([`CrcError::LengthBad`]), zero polynomial
    /// ([`CrcError::PolynomialZero`]), polynomial range
    /// ([`CrcError::PolynomialOversized`]), seed range
    /// ([`CrcError::InitValueOversized`]), final XOR range
    /// ([`CrcError::FinalXorOversized`]).
    pub fn new(config: CrcConfig) -> Result<Self, CrcError> {
        if !matches!(config.bit_length, 8 | 16 | 32) {
            return Err(CrcError::LengthBad(config.bit_length));
        }

        let mask = u32::MAX >> (32 - config.bit_length);

        if config.polynomial == 0 {
            return Err(CrcError::PolynomialZero);
        }
        if config.polynomial > mask {
            return Err(CrcError::PolynomialOversized(config.polynomial, config.bit_length));
        }
        if config.initial_value > mask {
            return Err(CrcError::InitValueOversized(config.initial_value, config.bit_length));
        }
        if config.final_xor_value > mask {
            return Err(CrcError::FinalXorOversized(config.final_xor_value, config.bit_length));
        }

        let table = build_table(config.bit_length, config.polynomial, mask);

        Ok(Self { config, mask, table })
    }

    /// The validated configuration this engine was built from
    pub fn config(&self) -> &CrcConfig {
        &self.config
    }

    /// Calculate the checksum bit by bit (reference implementation)
    ///
    /// Kept as the ground truth the table-driven path is tested against.
    pub fn calc_slow(&self, data: &[u8]) -> u32 {
        let highest_bit = 1u32 << (self.config.bit_length - 1);
        let mut checksum = self.config.initial_value;

        for &byte in data {
            let input = if self.config.input_reflected {
                reflect(u32::from(byte), 8)
            } else {
                u32::from(byte)
            };
            checksum ^= input << (self.config.bit_length - 8);

            for _ in 0..8 {
                if checksum & highest_bit != 0 {
                    checksum = (checksum << 1) ^ self.config.polynomial;
                } else {
                    checksum <<= 1;
                }
            }
        }

        self.finalize(checksum)
    }

    /// Calculate the checksum through the lookup table
    ///
    /// Folds the precomputed contribution of each byte value into the
    /// register instead of iterating its bits. External behavior is
    /// identical to [`CrcEngine::calc_slow`] for every valid configuration.
    pub fn calc_fast(&self, data: &[u8]) -> u32 {
        let mut checksum = self.config.initial_value;

        for &byte in data {
            let input = if self.config.input_reflected {
                reflect(u32::from(byte), 8)
            } else {
                u32::from(byte)
            };
            let index = (input ^ (checksum >> (self.config.bit_length - 8))) as u8;
            checksum = self.table[usize::from(index)] ^ (checksum << 8);
        }

        self.finalize(checksum)
    }

    /// Checksum truncated to the 16-bit frame CRC field
    pub fn frame_checksum(&self, data: &[u8]) -> u16 {
        (self.calc_fast(data) & 0xFFFF) as u16
    }

    fn finalize(&self, checksum: u32) -> u32 {
        let checksum = if self.config.result_reflected {
            reflect(checksum & self.mask, self.config.bit_length)
        } else {
            checksum
        };
        (checksum ^ self.config.final_xor_value) & self.mask
    }
}

/// Reverse the lowest `width` bits of `value`
fn reflect(value: u32, width: u8) -> u32 {
    let mut value = value;
    let mut reflection = 0u32;
    for i in 0..width {
        if value & 1 != 0 {
            reflection |= 1 << (width - 1 - i);
        }
        value >>= 1;
    }
    reflection
}

/// Partial checksum of every possible byte value, masked to the bit length
fn build_table(bit_length: u8, polynomial: u32, mask: u32) -> [u32; 256] {
    let highest_bit = 1u32 << (bit_length - 1);
    let mut table = [0u32; 256];

    for (byte, entry) in table.iter_mut().enumerate() {
        let mut checksum = byte as u32;
        for _ in 0..bit_length {
            if checksum & highest_bit != 0 {
                checksum = (checksum << 1) ^ polynomial;
            } else {
                checksum <<= 1;
            }
        }
        *entry = checksum & mask;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_engine() -> CrcEngine {
        CrcEngine::new(CrcConfig::default()).unwrap()
    }

    #[test]
    fn test_default_config_known_vectors() {
        let engine = default_engine();

        // CRC-16/XMODEM check value
        assert_eq!(engine.calc_fast(b"123456789"), 0x31C3);

        // The frame portion used by the end-to-end link tests
        let frame: Vec<u8> = (0x01..=0x0B).collect();
        assert_eq!(engine.calc_fast(&frame), 0xF28A);
    }

    #[test]
    fn test_empty_and_zero_input() {
        let engine = default_engine();
        assert_eq!(engine.calc_fast(&[]), 0x0000);
        assert_eq!(engine.calc_fast(&[0u8; 11]), 0x0000);
        assert_eq!(engine.calc_slow(&[0u8; 11]), 0x0000);
    }

    #[test]
    fn test_reflected_config_known_vector() {
        // CRC-16/KERMIT: same polynomial, both reflections on
        let engine = CrcEngine::new(CrcConfig {
            input_reflected: true,
            result_reflected: true,
            ..CrcConfig::default()
        })
        .unwrap();
        assert_eq!(engine.calc_fast(b"123456789"), 0x2189);
        assert_eq!(engine.calc_slow(b"123456789"), 0x2189);
    }

    #[test]
    fn test_crc32_known_vector() {
        // CRC-32/ISO-HDLC
        let engine = CrcEngine::new(CrcConfig {
            bit_length: 32,
            polynomial: 0x04C1_1DB7,
            initial_value: 0xFFFF_FFFF,
            final_xor_value: 0xFFFF_FFFF,
            input_reflected: true,
            result_reflected: true,
        })
        .unwrap();
        assert_eq!(engine.calc_fast(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_fast_matches_slow_across_configs() {
        let configs = [
            CrcConfig::default(),
            CrcConfig {
                bit_length: 8,
                polynomial: 0xD5,
                initial_value: 0,
                final_xor_value: 0,
                input_reflected: false,
                result_reflected: false,
            },
            CrcConfig {
                bit_length: 16,
                polynomial: 0x8005,
                initial_value: 0xFFFF,
                final_xor_value: 0x0000,
                input_reflected: true,
                result_reflected: false,
            },
            CrcConfig {
                bit_length: 32,
                polynomial: 0x04C1_1DB7,
                initial_value: 0xFFFF_FFFF,
                final_xor_value: 0xFFFF_FFFF,
                input_reflected: true,
                result_reflected: true,
            },
        ];

        // A pseudo-random but reproducible byte soup plus the edge inputs
        let mut noisy = Vec::new();
        let mut seed: u32 = 0xACE1;
        for _ in 0..64 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            noisy.push((seed >> 16) as u8);
        }
        let inputs: [&[u8]; 5] = [&[], &[0u8; 13], &[0xFF; 13], b"123456789", &noisy];

        for config in configs {
            let engine = CrcEngine::new(config).unwrap();
            for input in inputs {
                assert_eq!(
                    engine.calc_fast(input),
                    engine.calc_slow(input),
                    "fast/slow mismatch for config {:?} input {:02X?}",
                    config,
                    input
                );
            }
        }
    }

    #[test]
    fn test_rejects_bad_bit_length() {
        let result = CrcEngine::new(CrcConfig {
            bit_length: 1,
            ..CrcConfig::default()
        });
        assert_eq!(result.err(), Some(CrcError::LengthBad(1)));
    }

    #[test]
    fn test_rejects_zero_polynomial() {
        let result = CrcEngine::new(CrcConfig {
            polynomial: 0,
            ..CrcConfig::default()
        });
        assert_eq!(result.err(), Some(CrcError::PolynomialZero));
    }

    #[test]
    fn test_rejects_oversized_polynomial() {
        let result = CrcEngine::new(CrcConfig {
            polynomial: 0x1_0000,
            ..CrcConfig::default()
        });
        assert_eq!(result.err(), Some(CrcError::PolynomialOversized(0x1_0000, 16)));
    }

    #[test]
    fn test_rejects_oversized_initial_value() {
        let result = CrcEngine::new(CrcConfig {
            initial_value: 0x1_0000,
            ..CrcConfig::default()
        });
        assert_eq!(result.err(), Some(CrcError::InitValueOversized(0x1_0000, 16)));
    }

    #[test]
    fn test_rejects_oversized_final_xor() {
        let result = CrcEngine::new(CrcConfig {
            final_xor_value: 0x1_0000,
            ..CrcConfig::default()
        });
        assert_eq!(result.err(), Some(CrcError::FinalXorOversized(0x1_0000, 16)));
    }

    #[test]
    fn test_checksum_changes_with_data() {
        let engine = default_engine();
        let a = engine.calc_fast(&[0x01, 0x02, 0x03]);
        let b = engine.calc_fast(&[0x01, 0x02, 0x04]);
        assert_ne!(a, b, "checksum should change when data changes");
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(0b0000_0001, 8), 0b1000_0000);
        assert_eq!(reflect(0xA001, 16), 0x8005);
        assert_eq!(reflect(0, 32), 0);
    }
}
