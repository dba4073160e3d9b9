// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Big-endian field helpers shared by APDU encodings

use byteorder::{BigEndian, ByteOrder};

use crate::ApduError;

/// Write a single byte
pub(crate) fn put_u8(buff: &mut [u8], v: u8) -> Result<usize, ApduError> {
    if buff.is_empty() {
        return Err(ApduError::InvalidLength);
    }

    buff[0] = v;

    Ok(1)
}

/// Write a big-endian u32
pub(crate) fn put_u32(buff: &mut [u8], v: u32) -> Result<usize, ApduError> {
    if buff.len() < 4 {
        return Err(ApduError::InvalidLength);
    }

    BigEndian::write_u32(&mut buff[..4], v);

    Ok(4)
}

/// Write a big-endian u64
pub(crate) fn put_u64(buff: &mut [u8], v: u64) -> Result<usize, ApduError> {
    if buff.len() < 8 {
        return Err(ApduError::InvalidLength);
    }

    BigEndian::write_u64(&mut buff[..8], v);

    Ok(8)
}

/// Write a big-endian (two's complement) i64
pub(crate) fn put_i64(buff: &mut [u8], v: i64) -> Result<usize, ApduError> {
    if buff.len() < 8 {
        return Err(ApduError::InvalidLength);
    }

    BigEndian::write_i64(&mut buff[..8], v);

    Ok(8)
}

/// Write a raw byte slice
pub(crate) fn put_slice(buff: &mut [u8], d: &[u8]) -> Result<usize, ApduError> {
    if buff.len() < d.len() {
        return Err(ApduError::InvalidLength);
    }

    buff[..d.len()].copy_from_slice(d);

    Ok(d.len())
}

/// Write a u32 length prefix followed by the provided bytes
pub(crate) fn put_sized(buff: &mut [u8], d: &[u8]) -> Result<usize, ApduError> {
    let mut index = 0;

    index += put_u32(buff, len_u32(d.len())?)?;
    index += put_slice(&mut buff[index..], d)?;

    Ok(index)
}

/// Convert a buffer length to a u32 length field
pub(crate) fn len_u32(n: usize) -> Result<u32, ApduError> {
    u32::try_from(n).map_err(|_| ApduError::InvalidLength)
}

/// Read a big-endian u32
pub(crate) fn get_u32(buff: &[u8]) -> Result<(u32, usize), ApduError> {
    if buff.len() < 4 {
        return Err(ApduError::InvalidLength);
    }

    Ok((BigEndian::read_u32(&buff[..4]), 4))
}

/// Read a fixed size array
pub(crate) fn get_arr<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), ApduError> {
    if buff.len() < N {
        return Err(ApduError::InvalidLength);
    }

    let mut d = [0u8; N];
    d.copy_from_slice(&buff[..N]);

    Ok((d, N))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn big_endian_fields() {
        let mut buff = [0u8; 8];

        assert_eq!(put_u32(&mut buff, 0x0102_0304), Ok(4));
        assert_eq!(&buff[..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(get_u32(&buff), Ok((0x0102_0304, 4)));

        assert_eq!(put_u64(&mut buff, 0x0102_0304_0506_0708), Ok(8));
        assert_eq!(buff, [1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(put_i64(&mut buff, -1), Ok(8));
        assert_eq!(buff, [0xff; 8]);
    }

    #[test]
    fn short_buffers_rejected() {
        let mut buff = [0u8; 3];

        assert_eq!(put_u32(&mut buff, 1), Err(ApduError::InvalidLength));
        assert_eq!(put_u64(&mut buff, 1), Err(ApduError::InvalidLength));
        assert_eq!(put_slice(&mut buff, &[0u8; 4]), Err(ApduError::InvalidLength));
        assert_eq!(get_arr::<4>(&buff), Err(ApduError::InvalidLength));
    }
}
