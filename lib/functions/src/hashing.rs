//! The id/hash function family (§4.2 `MD5`/`SHA1`/`SHA256`/`SHA384`/`SHA512`), each
//! returning the lowercase hex digest of the UTF-8 bytes of its argument's lexical
//! form — delegated entirely to the upstream hashing crates, never hand-rolled.

pub fn md5_hex(input: &str) -> String {
    let digest = md5::Md5::digest(input.as_bytes());
    hex::encode(digest)
}

pub fn sha1_hex(input: &str) -> String {
    let digest = sha1::Sha1::digest(input.as_bytes());
    hex::encode(digest)
}

pub fn sha256_hex(input: &str) -> String {
    let digest = sha2::Sha256::digest(input.as_bytes());
    hex::encode(digest)
}

pub fn sha384_hex(input: &str) -> String {
    let digest = sha2::Sha384::digest(input.as_bytes());
    hex::encode(digest)
}

pub fn sha512_hex(input: &str) -> String {
    let digest = sha2::Sha512::digest(input.as_bytes());
    hex::encode(digest)
}

use md5::Digest as Md5Digest;
use sha1::Digest as Sha1Digest;
use sha2::Digest as Sha2Digest;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_matches_known_vector() {
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn sha1_matches_known_vector() {
        assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89");
    }

    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"[..64]
                .to_string()
        );
    }
}
