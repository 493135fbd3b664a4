//! Validation module for verifying stored objects against manifest checksums.

pub mod checksum;

pub use checksum::{
    checksums_match, md5_hex, md5_stream, ChecksumVerifier, ObjectDigest, VerifyOutcome,
    CHUNK_SIZE,
};
