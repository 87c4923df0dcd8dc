use crate::errors::QkdError;

/// Front of `key` matching `data_len`. A longer key is cut, a shorter one is an error.
pub fn shorten_key(data_len: usize, key: &[bool]) -> Result<&[bool], QkdError> {
    if key.len() < data_len {
        return Err(QkdError::KeyTooShort {
            key_len: key.len(),
            data_len,
        });
    }
    Ok(&key[..data_len])
}

/// Bitwise XOR of `data` with the front of `key`.
pub fn xor_encrypt(data: &[bool], key: &[bool]) -> Result<Vec<bool>, QkdError> {
    let key = shorten_key(data.len(), key)?;
    Ok(data.iter().zip(key).map(|(&d, &k)| d ^ k).collect())
}

/// XOR is its own inverse.
pub use self::xor_encrypt as xor_decrypt;
