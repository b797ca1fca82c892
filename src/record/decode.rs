/// Quality value reserved to mark a position without a call
pub const NO_CALL_QUALITY: u8 = 63;

/// Offset applied to qualities when written as FASTQ characters
pub const PHRED_OFFSET: u8 = 33;

/// The symbol alphabet of a tag's calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSpace {
    /// Bases `ACGT`, wildcard `N`
    Nucleotide,
    /// Colors `0123`, wildcard `.`
    Color,
}
impl CallSpace {
    #[must_use]
    pub const fn alphabet(self) -> &'static [u8; 4] {
        match self {
            Self::Nucleotide => b"ACGT",
            Self::Color => b"0123",
        }
    }

    #[must_use]
    pub const fn wildcard(self) -> u8 {
        match self {
            Self::Nucleotide => b'N',
            Self::Color => b'.',
        }
    }
}

/// Decodes one packed byte into its `(call, quality)` pair.
///
/// The low two bits index the call alphabet and the high six bits are the
/// quality. A quality of [`NO_CALL_QUALITY`] is reported as the space's
/// wildcard with quality zero. Every byte value is accepted.
#[inline]
#[must_use]
pub fn decode_byte(byte: u8, space: CallSpace) -> (u8, u8) {
    let quality = byte >> 2;
    if quality == NO_CALL_QUALITY {
        (space.wildcard(), 0)
    } else {
        (space.alphabet()[usize::from(byte & 0x03)], quality)
    }
}

/// Decodes a full row of packed bytes, appending calls and raw qualities
pub fn decode_row(row: &[u8], space: CallSpace, calls: &mut Vec<u8>, quals: &mut Vec<u8>) {
    calls.reserve(row.len());
    quals.reserve(row.len());
    for &byte in row {
        let (call, qual) = decode_byte(byte, space);
        calls.push(call);
        quals.push(qual);
    }
}
