//! [`Register`] – a typed, addressable data slot within a service.
//!
//! Registers hold the raw little-endian payload last reported by the device
//! together with the [`PackFormat`] of each field. [`Register::unpack`]
//! decodes the payload into a tuple of `f64` values; a register that has
//! never been reported is "not loaded" and unpacks to `None`.
//!
//! # Formats
//!
//! | Format | Width | Meaning |
//! |---|---|---|
//! | `U8` / `U16` / `U32` | 1 / 2 / 4 | unsigned integer |
//! | `I16` / `I32` | 2 / 4 | signed integer |
//! | `U0_8` / `U0_16` | 1 / 2 | unsigned fraction in `[0, 1]` |
//! | `U4_12` | 2 | unsigned fixed point, 12 fractional bits |
//! | `U16_16` / `I16_16` | 4 | fixed point, 16 fractional bits |
//! | `I22_10` | 4 | signed fixed point, 10 fractional bits |
//! | `F32` / `F64` | 4 / 8 | IEEE float |
//! | `Bool` | 1 | non-zero is `true` (1.0) |

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use fwdash_types::{DashError, RegisterId};
use tracing::{trace, warn};

/// Wire encoding of a single register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackFormat {
    U8,
    U16,
    U32,
    I16,
    I32,
    U0_8,
    U0_16,
    U4_12,
    U16_16,
    I16_16,
    I22_10,
    F32,
    F64,
    Bool,
}

impl PackFormat {
    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        match self {
            PackFormat::U8 | PackFormat::U0_8 | PackFormat::Bool => 1,
            PackFormat::U16 | PackFormat::I16 | PackFormat::U0_16 | PackFormat::U4_12 => 2,
            PackFormat::U32
            | PackFormat::I32
            | PackFormat::U16_16
            | PackFormat::I16_16
            | PackFormat::I22_10
            | PackFormat::F32 => 4,
            PackFormat::F64 => 8,
        }
    }

    /// Decode one field. `bytes` must be exactly [`width`](Self::width) long.
    fn decode(&self, bytes: &[u8]) -> f64 {
        let u16_le = || u16::from_le_bytes([bytes[0], bytes[1]]);
        let u32_le = || u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        match self {
            PackFormat::U8 => f64::from(bytes[0]),
            PackFormat::U16 => f64::from(u16_le()),
            PackFormat::U32 => f64::from(u32_le()),
            PackFormat::I16 => f64::from(u16_le() as i16),
            PackFormat::I32 => f64::from(u32_le() as i32),
            PackFormat::U0_8 => f64::from(bytes[0]) / f64::from(u8::MAX),
            PackFormat::U0_16 => f64::from(u16_le()) / f64::from(u16::MAX),
            PackFormat::U4_12 => f64::from(u16_le()) / 4096.0,
            PackFormat::U16_16 => f64::from(u32_le()) / 65536.0,
            PackFormat::I16_16 => f64::from(u32_le() as i32) / 65536.0,
            PackFormat::I22_10 => f64::from(u32_le() as i32) / 1024.0,
            PackFormat::F32 => f64::from(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            PackFormat::F64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                f64::from_le_bytes(raw)
            }
            PackFormat::Bool => {
                if bytes[0] != 0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Encode one field, appending it to `out`.
    fn encode(&self, value: f64, out: &mut Vec<u8>) -> Result<(), String> {
        if value.is_nan() {
            return Err("cannot pack NaN".to_string());
        }
        match self {
            PackFormat::U8 => out.push(int_in_range(value, 0.0, f64::from(u8::MAX))? as u8),
            PackFormat::U16 => {
                let v = int_in_range(value, 0.0, f64::from(u16::MAX))? as u16;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::U32 => {
                let v = int_in_range(value, 0.0, f64::from(u32::MAX))? as u32;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::I16 => {
                let v = int_in_range(value, f64::from(i16::MIN), f64::from(i16::MAX))? as i16;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::I32 => {
                let v = int_in_range(value, f64::from(i32::MIN), f64::from(i32::MAX))? as i32;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::U0_8 => out.push((value.clamp(0.0, 1.0) * f64::from(u8::MAX)).round() as u8),
            PackFormat::U0_16 => {
                let v = (value.clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::U4_12 => {
                let v = int_in_range(value * 4096.0, 0.0, f64::from(u16::MAX))? as u16;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::U16_16 => {
                let v = int_in_range(value * 65536.0, 0.0, f64::from(u32::MAX))? as u32;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::I16_16 => {
                let v = int_in_range(value * 65536.0, f64::from(i32::MIN), f64::from(i32::MAX))?
                    as i32;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::I22_10 => {
                let v = int_in_range(value * 1024.0, f64::from(i32::MIN), f64::from(i32::MAX))?
                    as i32;
                out.extend_from_slice(&v.to_le_bytes());
            }
            PackFormat::F32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
            PackFormat::F64 => out.extend_from_slice(&value.to_le_bytes()),
            PackFormat::Bool => out.push(u8::from(value != 0.0)),
        }
        Ok(())
    }
}

fn int_in_range(value: f64, min: f64, max: f64) -> Result<f64, String> {
    let rounded = value.round();
    if rounded < min || rounded > max {
        return Err(format!("{value} is outside [{min}, {max}]"));
    }
    Ok(rounded)
}

/// Decode as many complete fields as `data` holds.
///
/// Trailing fields missing from a short payload are omitted rather than
/// treated as an error, so callers reading only the first element still see
/// a value.
pub fn unpack(formats: &[PackFormat], data: &[u8]) -> Vec<f64> {
    let mut values = Vec::with_capacity(formats.len());
    let mut offset = 0;
    for format in formats {
        let end = offset + format.width();
        if end > data.len() {
            break;
        }
        values.push(format.decode(&data[offset..end]));
        offset = end;
    }
    values
}

/// Encode `values` field by field. Extra values beyond `formats` are rejected.
pub fn pack(formats: &[PackFormat], values: &[f64]) -> Result<Vec<u8>, String> {
    if values.len() > formats.len() {
        return Err(format!(
            "{} values for {} fields",
            values.len(),
            formats.len()
        ));
    }
    let mut out = Vec::new();
    for (format, value) in formats.iter().zip(values) {
        format.encode(*value, &mut out)?;
    }
    Ok(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Register
// ─────────────────────────────────────────────────────────────────────────────

/// A register shared between the device layer, simulated servers and widgets.
#[derive(Debug)]
pub struct Register {
    id: RegisterId,
    formats: Vec<PackFormat>,
    data: RwLock<Option<Vec<u8>>>,
    version: AtomicU64,
    refresh_requests: AtomicUsize,
}

impl Register {
    /// Create an empty (not loaded) register.
    pub fn new(id: RegisterId, formats: Vec<PackFormat>) -> Self {
        Self {
            id,
            formats,
            data: RwLock::new(None),
            version: AtomicU64::new(0),
            refresh_requests: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> RegisterId {
        self.id
    }

    pub fn formats(&self) -> &[PackFormat] {
        &self.formats
    }

    /// Raw payload, `None` until the device reports it.
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store a payload reported by the device.
    pub fn set_raw(&self, bytes: Vec<u8>) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    /// Decode the payload into a tuple of values.
    ///
    /// Returns `None` when the register is not loaded or has no known format.
    pub fn unpack(&self) -> Option<Vec<f64>> {
        if self.formats.is_empty() {
            return None;
        }
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let data = guard.as_ref()?;
        let values = unpack(&self.formats, data);
        if values.is_empty() {
            warn!(register = %self.id, len = data.len(), "register payload shorter than first field");
        }
        Some(values)
    }

    /// First element of the unpacked tuple.
    pub fn first_value(&self) -> Option<f64> {
        self.unpack().and_then(|values| values.first().copied())
    }

    /// Pack `values` and store them as the register's new payload.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Codec`] when a value cannot be encoded with the
    /// register's formats.
    pub fn write(&self, values: &[f64]) -> Result<(), DashError> {
        let bytes = pack(&self.formats, values).map_err(|details| DashError::Codec {
            register: self.id,
            details,
        })?;
        trace!(register = %self.id, ?values, "register write");
        self.set_raw(bytes);
        Ok(())
    }

    /// Ask the device to report the register again.
    pub fn refresh(&self) {
        self.refresh_requests.fetch_add(1, Ordering::SeqCst);
        trace!(register = %self.id, "register refresh requested");
    }

    /// Number of refresh requests issued so far.
    pub fn refresh_requests(&self) -> usize {
        self.refresh_requests.load(Ordering::SeqCst)
    }

    /// Incremented every time the payload changes.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_register_is_not_loaded() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::U16]);
        assert!(reg.unpack().is_none());
        assert!(reg.first_value().is_none());
        assert_eq!(reg.version(), 0);
    }

    #[test]
    fn register_without_format_never_unpacks() {
        let reg = Register::new(RegisterId(0x42), Vec::new());
        reg.set_raw(vec![1, 2, 3]);
        assert!(reg.unpack().is_none());
    }

    #[test]
    fn fixed_point_distance_reading() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::U16_16]);
        // 1.5 m in u16.16
        reg.set_raw(0x0001_8000u32.to_le_bytes().to_vec());
        assert_eq!(reg.first_value(), Some(1.5));
    }

    #[test]
    fn signed_encoder_ticks() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::I32]);
        reg.set_raw((-7i32).to_le_bytes().to_vec());
        assert_eq!(reg.first_value(), Some(-7.0));
    }

    #[test]
    fn temperature_i22_10() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::I22_10]);
        reg.write(&[21.5]).unwrap();
        assert_eq!(reg.raw().unwrap(), (22016i32).to_le_bytes().to_vec());
        assert_eq!(reg.first_value(), Some(21.5));
    }

    #[test]
    fn fraction_write_clamps() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::U0_16]);
        reg.write(&[1.0]).unwrap();
        assert_eq!(reg.first_value(), Some(1.0));
        reg.write(&[3.0]).unwrap();
        assert_eq!(reg.first_value(), Some(1.0));
        reg.write(&[0.0]).unwrap();
        assert_eq!(reg.first_value(), Some(0.0));
    }

    #[test]
    fn tuple_payload_decodes_all_fields() {
        let formats = [PackFormat::U8, PackFormat::I16, PackFormat::Bool];
        let data = [7u8, 0xfe, 0xff, 1];
        assert_eq!(unpack(&formats, &data), vec![7.0, -2.0, 1.0]);
    }

    #[test]
    fn short_payload_drops_trailing_fields() {
        let formats = [PackFormat::U16, PackFormat::U32];
        let data = [0x10, 0x00, 0xaa];
        assert_eq!(unpack(&formats, &data), vec![16.0]);
    }

    #[test]
    fn write_out_of_range_is_codec_error() {
        let reg = Register::new(RegisterId::CLICKS_PER_TURN, vec![PackFormat::U16]);
        let err = reg.write(&[70_000.0]).unwrap_err();
        assert!(matches!(err, DashError::Codec { register, .. } if register == RegisterId::CLICKS_PER_TURN));
        assert!(reg.raw().is_none());
    }

    #[test]
    fn write_rejects_nan_and_extra_values() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::F64]);
        assert!(reg.write(&[f64::NAN]).is_err());
        assert!(reg.write(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn refresh_is_counted() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::U8]);
        reg.refresh();
        reg.refresh();
        assert_eq!(reg.refresh_requests(), 2);
    }

    #[test]
    fn set_raw_bumps_version() {
        let reg = Register::new(RegisterId::READING, vec![PackFormat::U8]);
        reg.set_raw(vec![1]);
        reg.write(&[2.0]).unwrap();
        assert_eq!(reg.version(), 2);
    }
}
