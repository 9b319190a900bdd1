//! Frame encryption used by TibiCAM `.rec` files
//!
//! From container version 515 onwards every frame is protected by an Adler-32 checksum and a
//! position dependent substitution. Versions 517 and 518 additionally wrap the payload in
//! AES-256 ECB with PKCS#7 style padding.

use adler2::Adler32;
use aes::{
    cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit},
    Aes256,
};

use crate::error::{Error, Result};

/// Fixed key shared by every encrypted recording
pub const AES_KEY: [u8; 32] = *b"Thy key is mine \xA9 2006 GB Monaco";

const AES_BLOCK: usize = 16;

/// Adler-32 of `data`, seeded with 1
pub fn checksum(data: &[u8]) -> u32 {
    let mut adler = Adler32::new();
    adler.write_slice(data);
    adler.checksum()
}

/// Decryption parameters for one `.rec` container version
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RecCipher {
    modulo: i32,
    aes: bool,
}

impl RecCipher {
    /// Parameters for `container_version`, [`None`] when frames are stored in the clear
    pub fn for_container(container_version: u16) -> Option<Self> {
        let (modulo, aes) = match container_version {
            515 => (5, false),
            516 => (8, false),
            517 => (8, true),
            518 => (6, true),
            _ => return None,
        };

        Some(Self { modulo, aes })
    }

    pub fn modulo(&self) -> i32 {
        self.modulo
    }

    pub fn uses_aes(&self) -> bool {
        self.aes
    }

    /// Verify and decrypt one frame
    pub fn decrypt(&self, file: &str, time: u32, data: &[u8], stored: u32) -> Result<Vec<u8>> {
        let calculated = checksum(data);
        if calculated != stored {
            return Err(Error::invalid(
                file,
                "checksum",
                format!("0x{calculated:08X}"),
                format!("0x{stored:08X}"),
            ));
        }

        let mut plain = data.to_vec();
        substitute(self.modulo, time, &mut plain, Direction::Decrypt);

        if self.aes {
            aes_decrypt(file, &plain)
        } else {
            Ok(plain)
        }
    }

    /// Encrypt one frame, returning the payload and its checksum
    pub fn encrypt(&self, time: u32, data: &[u8]) -> (Vec<u8>, u32) {
        let mut cipher = if self.aes {
            aes_encrypt(data)
        } else {
            data.to_vec()
        };

        substitute(self.modulo, time, &mut cipher, Direction::Encrypt);
        let sum = checksum(&cipher);
        (cipher, sum)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

fn substitute(modulo: i32, time: u32, data: &mut [u8], direction: Direction) {
    let key = (data.len() as u32).wrapping_add(time).wrapping_add(2) & 0xFF;

    for (i, byte) in data.iter_mut().enumerate() {
        let raw = (key as usize).wrapping_add(i.wrapping_mul(33)) & 0xFF;
        let mut minus = if raw > 127 {
            raw as i32 - 256
        } else {
            raw as i32
        };

        let remainder = minus.rem_euclid(modulo);
        if remainder != 0 {
            minus += modulo - remainder;
        }

        *byte = match direction {
            Direction::Decrypt => byte.wrapping_sub(minus as u8),
            Direction::Encrypt => byte.wrapping_add(minus as u8),
        };
    }
}

/// Strip the AES layer of a 517/518 frame
pub fn aes_decrypt(file: &str, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % AES_BLOCK != 0 {
        return Err(Error::invalid(
            file,
            "aes_length",
            data.len(),
            "a multiple of 16",
        ));
    }

    let cipher = Aes256::new(GenericArray::from_slice(&AES_KEY));
    let mut plain = data.to_vec();
    for block in plain.chunks_exact_mut(AES_BLOCK) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }

    let padding = plain.last().copied().unwrap_or_default();
    let pad = usize::from(padding);
    if pad == 0
        || pad > AES_BLOCK.min(plain.len())
        || plain[plain.len() - pad..].iter().any(|b| *b != padding)
    {
        return Err(Error::invalid(
            file,
            "padding",
            padding,
            format!("1..={AES_BLOCK} repeated bytes"),
        ));
    }

    plain.truncate(plain.len() - pad);
    Ok(plain)
}

/// Pad and encrypt `data` the way 517/518 frames are stored
pub fn aes_encrypt(data: &[u8]) -> Vec<u8> {
    let pad = AES_BLOCK - data.len() % AES_BLOCK;
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.resize(data.len() + pad, pad as u8);

    let cipher = Aes256::new(GenericArray::from_slice(&AES_KEY));
    for block in out.chunks_exact_mut(AES_BLOCK) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }

    out
}
