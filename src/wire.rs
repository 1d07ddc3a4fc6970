//! Binary decoders for 4D column values
//!
//! A result-set reply carries its rows as a packed byte stream directly after
//! the header block. The stream is not self-describing: each value's layout
//! is selected by the column type announced in the `Column-Types` header.
//! All integers are little-endian. Strings are UTF-16LE behind an inverted
//! length prefix, and `VK_FLOAT` is the server's own variable-precision
//! float encoding.
//!
//! Decoders are generic over any [`AsyncRead`] source so they run both
//! against the live socket and against captured byte slices in tests.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::constants::SqlType;
use crate::error::{Error, Result};
use crate::row::Value;

async fn read_bytes<R>(reader: &mut R, n: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; n];
    reader.read_exact(&mut buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ConnectionClosed
        } else {
            Error::Io(e)
        }
    })?;
    Ok(buf)
}

/// Read a single byte
pub async fn read_u8<R>(reader: &mut R) -> Result<u8>
where
    R: AsyncRead + Unpin,
{
    let buf = read_bytes(reader, 1).await?;
    Ok(buf[0])
}

/// Read a 16-bit unsigned integer in little-endian format
pub async fn read_u16_le<R>(reader: &mut R) -> Result<u16>
where
    R: AsyncRead + Unpin,
{
    let buf = read_bytes(reader, 2).await?;
    Ok(u16::from_le_bytes([buf[0], buf[1]]))
}

/// Read a 32-bit unsigned integer in little-endian format
pub async fn read_u32_le<R>(reader: &mut R) -> Result<u32>
where
    R: AsyncRead + Unpin,
{
    let buf = read_bytes(reader, 4).await?;
    Ok(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Read a 64-bit unsigned integer in little-endian format
pub async fn read_u64_le<R>(reader: &mut R) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let buf = read_bytes(reader, 8).await?;
    Ok(u64::from_le_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ]))
}

/// Read a `VK_BOOLEAN`: u16 LE, false iff zero
pub async fn read_boolean<R>(reader: &mut R) -> Result<bool>
where
    R: AsyncRead + Unpin,
{
    Ok(read_u16_le(reader).await? != 0)
}

/// Read a `VK_REAL`: the raw little-endian IEEE-754 double the server sends
pub async fn read_real<R>(reader: &mut R) -> Result<f64>
where
    R: AsyncRead + Unpin,
{
    let buf = read_bytes(reader, 8).await?;
    Ok(f64::from_le_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ]))
}

/// Read a `VK_FLOAT`, the server's variable-precision float.
///
/// Layout: u32 LE exponent, one sign byte, u32 LE data length `L`, then `L`
/// ASCII bytes of mantissa digits. The value is
/// `(-1)^sign * (1 + mantissa * 2^-23) * 2^(exp - 127)`.
pub async fn read_float<R>(reader: &mut R) -> Result<f64>
where
    R: AsyncRead + Unpin,
{
    let exponent = read_u32_le(reader).await?;
    let sign = read_u8(reader).await?;
    let len = read_u32_le(reader).await? as usize;
    let digits = read_bytes(reader, len).await?;

    let text = std::str::from_utf8(&digits)
        .map_err(|_| Error::Decode("non-ASCII mantissa in VK_FLOAT".to_string()))?;
    let mantissa = if text.is_empty() {
        0i64
    } else {
        text.trim()
            .parse::<i64>()
            .map_err(|_| Error::Decode(format!("invalid VK_FLOAT mantissa: {text:?}")))?
    };

    let sign = if sign == 0 { 1.0 } else { -1.0 };
    Ok(sign * (1.0 + mantissa as f64 * (-23f64).exp2()) * (exponent as f64 - 127.0).exp2())
}

/// Read a `VK_STRING`.
///
/// The u32 prefix is inverted: the effective character count is
/// `2^32 - raw_len`, followed by that many UTF-16LE code units (two bytes
/// each). A zero prefix means the empty string.
pub async fn read_string<R>(reader: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let raw_len = read_u32_le(reader).await?;
    if raw_len == 0 {
        return Ok(String::new());
    }

    let len = (1u64 << 32) - raw_len as u64;
    let raw = read_bytes(reader, (len * 2) as usize).await?;
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| Error::Decode("invalid UTF-16 in string column".to_string()))
}

/// Read a `VK_BLOB` / `VK_IMAGE`: u32 LE length, then that many raw bytes
pub async fn read_blob<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let len = read_u32_le(reader).await? as usize;
    read_bytes(reader, len).await
}

/// Read a `VK_TIMESTAMP` / `VK_TIME` and format it.
///
/// Layout: u16 LE year, u8 month, u8 day, u32 LE millis-of-day. A zero
/// millis field formats as `DD.MM.YYYY`, otherwise
/// `DD.MM.YYYY HH:MM:SS`.
pub async fn read_timestamp<R>(reader: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let year = read_u16_le(reader).await?;
    let month = read_u8(reader).await?;
    let day = read_u8(reader).await?;
    let millis = read_u32_le(reader).await?;

    if millis == 0 {
        return Ok(format!("{day:02}.{month:02}.{year:04}"));
    }
    let secs = millis / 1000;
    Ok(format!(
        "{:02}.{:02}.{:04} {:02}:{:02}:{:02}",
        day,
        month,
        year,
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    ))
}

/// Decode one column value according to its announced type
pub async fn decode_value<R>(reader: &mut R, ty: SqlType) -> Result<Value>
where
    R: AsyncRead + Unpin,
{
    let value = match ty {
        SqlType::Boolean => Value::Boolean(read_boolean(reader).await?),
        SqlType::Byte | SqlType::Word => Value::Integer(read_u16_le(reader).await? as i64),
        SqlType::Long => Value::Integer(read_u32_le(reader).await? as i32 as i64),
        SqlType::Long8 | SqlType::Duration => Value::Integer(read_u64_le(reader).await? as i64),
        SqlType::Real => Value::Float(read_real(reader).await?),
        SqlType::Float => Value::Float(read_float(reader).await?),
        SqlType::String => Value::String(read_string(reader).await?),
        SqlType::Blob | SqlType::Image => Value::Bytes(read_blob(reader).await?),
        SqlType::Timestamp | SqlType::Time => Value::DateTime(read_timestamp(reader).await?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scalar_reads() {
        let mut data: &[u8] = &[0x2A, 0x00, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(read_u16_le(&mut data).await.unwrap(), 42);
        assert_eq!(read_u32_le(&mut data).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_boolean_nonzero_is_true() {
        let mut data: &[u8] = &[0x00, 0x00, 0x01, 0x00, 0x00, 0x01];
        assert!(!read_boolean(&mut data).await.unwrap());
        assert!(read_boolean(&mut data).await.unwrap());
        // high byte alone is enough
        assert!(read_boolean(&mut data).await.unwrap());
    }

    #[tokio::test]
    async fn test_real_little_endian() {
        let mut data: &[u8] = &1.5f64.to_le_bytes()[..];
        assert_eq!(read_real(&mut data).await.unwrap(), 1.5);
    }

    #[tokio::test]
    async fn test_float_layout() {
        // exponent 127, positive sign, mantissa "0" -> exactly 1.0
        let mut frame = Vec::new();
        frame.extend_from_slice(&127u32.to_le_bytes());
        frame.push(0);
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.push(b'0');
        let mut data: &[u8] = &frame;
        assert_eq!(read_float(&mut data).await.unwrap(), 1.0);

        // exponent 128, negative sign, mantissa 2^22 -> -(1.5 * 2) = -3.0
        let mut frame = Vec::new();
        frame.extend_from_slice(&128u32.to_le_bytes());
        frame.push(1);
        let digits = (1u32 << 22).to_string();
        frame.extend_from_slice(&(digits.len() as u32).to_le_bytes());
        frame.extend_from_slice(digits.as_bytes());
        let mut data: &[u8] = &frame;
        assert_eq!(read_float(&mut data).await.unwrap(), -3.0);
    }

    #[tokio::test]
    async fn test_string_inverted_length() {
        // raw_len 0xFFFFFFFC -> 4 characters
        let mut frame = Vec::new();
        frame.extend_from_slice(&0xFFFF_FFFCu32.to_le_bytes());
        frame.extend_from_slice(&[0x41, 0x00, 0x42, 0x00, 0x43, 0x00, 0x44, 0x00]);
        let mut data: &[u8] = &frame;
        assert_eq!(read_string(&mut data).await.unwrap(), "ABCD");
    }

    #[tokio::test]
    async fn test_string_zero_prefix_is_empty() {
        let mut data: &[u8] = &[0x00, 0x00, 0x00, 0x00];
        assert_eq!(read_string(&mut data).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_blob_length_prefix() {
        let mut data: &[u8] = &[0x03, 0x00, 0x00, 0x00, 0xDE, 0xAD, 0xBE];
        assert_eq!(read_blob(&mut data).await.unwrap(), vec![0xDE, 0xAD, 0xBE]);
    }

    #[tokio::test]
    async fn test_timestamp_date_only() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&2020u16.to_le_bytes());
        frame.push(3);
        frame.push(4);
        frame.extend_from_slice(&0u32.to_le_bytes());
        let mut data: &[u8] = &frame;
        assert_eq!(read_timestamp(&mut data).await.unwrap(), "04.03.2020");
    }

    #[tokio::test]
    async fn test_timestamp_with_time_of_day() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&2020u16.to_le_bytes());
        frame.push(3);
        frame.push(4);
        frame.extend_from_slice(&3_661_000u32.to_le_bytes());
        let mut data: &[u8] = &frame;
        assert_eq!(
            read_timestamp(&mut data).await.unwrap(),
            "04.03.2020 01:01:01"
        );
    }

    #[tokio::test]
    async fn test_decode_value_long_is_signed() {
        let mut data: &[u8] = &0xFFFF_FFFFu32.to_le_bytes()[..];
        let value = decode_value(&mut data, SqlType::Long).await.unwrap();
        assert_eq!(value, Value::Integer(-1));
    }

    #[tokio::test]
    async fn test_short_read_surfaces_disconnect() {
        let mut data: &[u8] = &[0x01, 0x02];
        let err = read_u32_le(&mut data).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }
}
