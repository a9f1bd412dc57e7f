//! Skins whose files are known to be damaged at the source.
//!
//! Collected from failed runs: these files download fine but the zip
//! container inside is truncated or unreadable, so every upload attempt
//! fails the same way. Skipping them up front keeps batch output focused
//! on actionable failures.

use std::collections::HashSet;

/// md5s excluded from every upload batch.
pub(crate) const KNOWN_CORRUPT_MD5S: &[&str] = &[
    "02b7a2a25ee55f768cf6fee054b4e786",
    "15e3f90dbb09e2e00eb72b3eae0f8ed0",
    "3c4bd3a33bd383cbd78b8e4364e67bc7",
    "5917fe2acbd26a226a7012a485a87e33",
    "72fa9e5cd3cf22cd3e17402bbb5b3f1a",
    "8d945db240a6c5dd5b2882fbc5d03203",
    "a37620d911d9540dfc28a4ad2b4a412f",
    "c0b1e2c0c5f81daaa853a17883d930f2",
    "d9f2f5683c623b23811e0ffb8b3c2716",
    "f4e6dcb0a57e92e2ab6f13c41d247c4f",
];

/// The exclusion list as a set, for membership checks while filtering
/// the batch.
pub fn corrupt_set() -> HashSet<&'static str> {
    KNOWN_CORRUPT_MD5S.iter().copied().collect()
}
