use sha2::{Digest, Sha256};

/// Stable content fingerprint, `sha256:<hex>`.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            content_hash(b"abc"),
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn any_byte_change_changes_hash() {
        assert_ne!(content_hash(b"# Title\n"), content_hash(b"# Title \n"));
    }
}
