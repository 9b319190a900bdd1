#![allow(dead_code)]

/// A server packet with its length prefix
pub fn packet(data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u16).to_le_bytes().to_vec();
    out.extend_from_slice(data);
    out
}

/// An unencrypted TibiCAM file, one raw read per entry
pub fn plain_rec(reads: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&259u16.to_le_bytes());
    out.extend_from_slice(&(reads.len() as u32).to_le_bytes());
    for (time, data) in reads {
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&time.to_le_bytes());
        out.extend_from_slice(data);
    }
    out
}

/// A login notice as sent by the server, e.g. `Your last visit in Tibia: 9. Aug 2005.`
pub fn login_notice(text: &str) -> Vec<u8> {
    let mut message = vec![0xB4, 0x14];
    message.extend_from_slice(&(text.len() as u16).to_le_bytes());
    message.extend_from_slice(text.as_bytes());
    packet(&message)
}

/// A text packet holding only `text`
pub fn text(text: &str) -> Vec<u8> {
    packet(&packet(text.as_bytes()))
}

/// A TibiCAM file encrypted the way `container` stores frames
pub fn encrypted_rec(container: u16, reads: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let cipher = tibia_rec::crypto::RecCipher::for_container(container).unwrap();
    let mut out = Vec::new();
    out.extend_from_slice(&container.to_le_bytes());
    out.extend_from_slice(&(reads.len() as u32 + 57).to_le_bytes());
    for (time, data) in reads {
        let (encrypted, checksum) = cipher.encrypt(*time, data);
        out.extend_from_slice(&(encrypted.len() as u16).to_le_bytes());
        out.extend_from_slice(&time.to_le_bytes());
        out.extend_from_slice(&encrypted);
        out.extend_from_slice(&checksum.to_le_bytes());
    }
    out
}
