//! Bloom filter compatible with the pybloom-live serialization format.
//!
//! File layout:
//! - 40-byte little-endian header: `f64 error_rate`, `u64 num_slices`,
//!   `u64 bits_per_slice`, `u64 capacity`, `u64 count`
//! - bit array, least significant bit first within each byte
//!
//! Each key sets one bit in each of `num_slices` equally sized slices. The
//! per-slice positions come from salted digests whose algorithm depends on
//! how many hash bits the filter needs.

use std::f64::consts::LN_2;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::MembershipFilter;

const HEADER_LEN: usize = 40;

/// Errors from building, loading or filling a Bloom filter.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Filter header truncated")]
    TruncatedHeader,

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Bit length mismatch: expected {expected} bytes, found {found}")]
    LengthMismatch { expected: u64, found: u64 },

    #[error("Filter is at capacity ({0} items)")]
    AtCapacity(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashAlgo {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgo {
    /// Smallest digest covering `total_bits` of hash output.
    fn for_total_bits(total_bits: u64) -> Self {
        match total_bits {
            0..=128 => HashAlgo::Md5,
            129..=160 => HashAlgo::Sha1,
            161..=256 => HashAlgo::Sha256,
            257..=384 => HashAlgo::Sha384,
            _ => HashAlgo::Sha512,
        }
    }

    fn output_len(self) -> usize {
        match self {
            HashAlgo::Md5 => 16,
            HashAlgo::Sha1 => 20,
            HashAlgo::Sha256 => 32,
            HashAlgo::Sha384 => 48,
            HashAlgo::Sha512 => 64,
        }
    }

    fn digest(self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            HashAlgo::Md5 => digest_parts::<Md5>(parts),
            HashAlgo::Sha1 => digest_parts::<Sha1>(parts),
            HashAlgo::Sha256 => digest_parts::<Sha256>(parts),
            HashAlgo::Sha384 => digest_parts::<Sha384>(parts),
            HashAlgo::Sha512 => digest_parts::<Sha512>(parts),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(*part);
    }
    hasher.finalize().to_vec()
}

/// Maps keys to one position per slice.
#[derive(Debug, Clone)]
struct SliceHasher {
    algo: HashAlgo,
    /// Bytes per hash value (2, 4 or 8)
    chunk: usize,
    num_slices: usize,
    bits_per_slice: u64,
    /// Digest of the little-endian salt index, prepended to every key
    salts: Vec<Vec<u8>>,
}

impl SliceHasher {
    fn new(num_slices: u64, bits_per_slice: u64) -> Self {
        let chunk = if bits_per_slice >= 1 << 31 {
            8
        } else if bits_per_slice >= 1 << 15 {
            4
        } else {
            2
        };

        let algo = HashAlgo::for_total_bits(8 * num_slices * chunk as u64);
        let per_digest = algo.output_len() / chunk;
        let num_salts = num_slices.div_ceil(per_digest as u64);

        let salts = (0..num_salts)
            .map(|i| {
                let index = (i as u32).to_le_bytes();
                algo.digest(&[index.as_slice()])
            })
            .collect();

        Self {
            algo,
            chunk,
            num_slices: num_slices as usize,
            bits_per_slice,
            salts,
        }
    }

    /// Returns the position of `key` within each slice.
    fn positions(&self, key: &[u8]) -> Vec<u64> {
        let mut positions = Vec::with_capacity(self.num_slices);

        for salt in &self.salts {
            let digest = self.algo.digest(&[salt.as_slice(), key]);

            for chunk in digest.chunks_exact(self.chunk) {
                let value = match self.chunk {
                    2 => u16::from_le_bytes([chunk[0], chunk[1]]) as u64,
                    4 => u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as u64,
                    _ => {
                        let mut bytes = [0u8; 8];
                        bytes.copy_from_slice(chunk);
                        u64::from_le_bytes(bytes)
                    }
                };
                positions.push(value % self.bits_per_slice);

                if positions.len() == self.num_slices {
                    return positions;
                }
            }
        }

        positions
    }
}

/// A fixed-size Bloom filter over address strings.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    error_rate: f64,
    num_slices: u64,
    bits_per_slice: u64,
    capacity: u64,
    count: u64,
    bits: Vec<u8>,
    hasher: SliceHasher,
}

impl BloomFilter {
    /// Creates an empty filter sized for `capacity` items at `error_rate`.
    pub fn with_capacity(capacity: u64, error_rate: f64) -> Result<Self, FilterError> {
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(FilterError::InvalidParameters(format!(
                "error rate must be between 0 and 1, got {}",
                error_rate
            )));
        }
        if capacity == 0 {
            return Err(FilterError::InvalidParameters(
                "capacity must be greater than 0".into(),
            ));
        }

        let num_slices = (1.0 / error_rate).log2().ceil() as u64;
        let bits_per_slice = ((capacity as f64 * error_rate.ln().abs())
            / (num_slices as f64 * LN_2 * LN_2))
            .ceil() as u64;

        Self::empty(error_rate, num_slices, bits_per_slice, capacity)
    }

    fn empty(
        error_rate: f64,
        num_slices: u64,
        bits_per_slice: u64,
        capacity: u64,
    ) -> Result<Self, FilterError> {
        let num_bits = Self::checked_num_bits(num_slices, bits_per_slice)?;
        let bits = vec![0u8; num_bits.div_ceil(8) as usize];

        Ok(Self {
            error_rate,
            num_slices,
            bits_per_slice,
            capacity,
            count: 0,
            bits,
            hasher: SliceHasher::new(num_slices, bits_per_slice),
        })
    }

    fn checked_num_bits(num_slices: u64, bits_per_slice: u64) -> Result<u64, FilterError> {
        if num_slices == 0 || num_slices > u32::MAX as u64 {
            return Err(FilterError::InvalidParameters(format!(
                "invalid slice count {}",
                num_slices
            )));
        }
        if bits_per_slice == 0 {
            return Err(FilterError::InvalidParameters(
                "bits per slice must be greater than 0".into(),
            ));
        }
        num_slices
            .checked_mul(bits_per_slice)
            .ok_or_else(|| FilterError::InvalidParameters("filter size overflows".into()))
    }

    /// Loads a filter from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads a serialized filter (header followed by the bit array).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, FilterError> {
        let mut header = [0u8; HEADER_LEN];
        reader.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FilterError::TruncatedHeader,
            _ => FilterError::Io(e),
        })?;

        let field = |i: usize| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&header[i * 8..(i + 1) * 8]);
            bytes
        };
        let error_rate = f64::from_le_bytes(field(0));
        let num_slices = u64::from_le_bytes(field(1));
        let bits_per_slice = u64::from_le_bytes(field(2));
        let capacity = u64::from_le_bytes(field(3));
        let count = u64::from_le_bytes(field(4));

        let num_bits = Self::checked_num_bits(num_slices, bits_per_slice)?;
        let expected = num_bits.div_ceil(8);

        let mut bits = Vec::new();
        reader.read_to_end(&mut bits)?;
        if bits.len() as u64 != expected {
            return Err(FilterError::LengthMismatch {
                expected,
                found: bits.len() as u64,
            });
        }

        Ok(Self {
            error_rate,
            num_slices,
            bits_per_slice,
            capacity,
            count,
            bits,
            hasher: SliceHasher::new(num_slices, bits_per_slice),
        })
    }

    /// Writes the filter in the same format [`BloomFilter::from_reader`] reads.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.error_rate.to_le_bytes())?;
        writer.write_all(&self.num_slices.to_le_bytes())?;
        writer.write_all(&self.bits_per_slice.to_le_bytes())?;
        writer.write_all(&self.capacity.to_le_bytes())?;
        writer.write_all(&self.count.to_le_bytes())?;
        writer.write_all(&self.bits)?;
        writer.flush()
    }

    /// Saves the filter to a file, replacing any existing one.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Adds a key to the filter.
    ///
    /// Returns `Ok(false)` if every bit for the key was already set.
    pub fn insert(&mut self, key: &str) -> Result<bool, FilterError> {
        if self.count > self.capacity {
            return Err(FilterError::AtCapacity(self.capacity));
        }

        let mut already_present = true;
        for (slice, position) in self.hasher.positions(key.as_bytes()).into_iter().enumerate() {
            let index = slice as u64 * self.bits_per_slice + position;
            if !self.bit(index) {
                already_present = false;
                self.set_bit(index);
            }
        }

        if !already_present {
            self.count += 1;
        }
        Ok(!already_present)
    }

    #[inline]
    fn bit(&self, index: u64) -> bool {
        (self.bits[(index / 8) as usize] >> (index % 8)) & 1 == 1
    }

    #[inline]
    fn set_bit(&mut self, index: u64) {
        self.bits[(index / 8) as usize] |= 1 << (index % 8);
    }

    /// Returns the number of distinct keys added.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Returns true if no keys have been added.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the configured false-positive rate at capacity.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Returns the total number of bits.
    pub fn num_bits(&self) -> u64 {
        self.num_slices * self.bits_per_slice
    }
}

impl MembershipFilter for BloomFilter {
    fn maybe_contains(&self, item: &str) -> bool {
        self.hasher
            .positions(item.as_bytes())
            .into_iter()
            .enumerate()
            .all(|(slice, position)| self.bit(slice as u64 * self.bits_per_slice + position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm";

    #[test]
    fn test_algorithm_selection() {
        assert_eq!(HashAlgo::for_total_bits(112), HashAlgo::Md5);
        assert_eq!(HashAlgo::for_total_bits(160), HashAlgo::Sha1);
        assert_eq!(HashAlgo::for_total_bits(224), HashAlgo::Sha256);
        assert_eq!(HashAlgo::for_total_bits(384), HashAlgo::Sha384);
        assert_eq!(HashAlgo::for_total_bits(448), HashAlgo::Sha512);
    }

    #[test]
    fn test_positions_sha256_layout() {
        // 7 slices of 40000 bits: 4-byte chunks, 224 hash bits -> SHA-256
        let hasher = SliceHasher::new(7, 40_000);
        assert_eq!(hasher.algo, HashAlgo::Sha256);
        assert_eq!(
            hasher.positions(ADDRESS.as_bytes()),
            vec![25469, 35416, 18859, 30140, 24872, 19678, 29059]
        );
    }

    #[test]
    fn test_positions_md5_layout() {
        // 7 slices of 1000 bits: 2-byte chunks, 112 hash bits -> MD5
        let hasher = SliceHasher::new(7, 1_000);
        assert_eq!(hasher.algo, HashAlgo::Md5);
        assert_eq!(
            hasher.positions(ADDRESS.as_bytes()),
            vec![252, 791, 659, 742, 815, 772, 491]
        );
    }

    #[test]
    fn test_sizing() {
        let filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        assert_eq!(filter.num_slices, 7);
        assert_eq!(filter.bits_per_slice, 1370);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_insert_and_query() {
        let mut filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        assert!(!filter.maybe_contains(ADDRESS));

        assert!(filter.insert(ADDRESS).unwrap());
        assert!(!filter.insert(ADDRESS).unwrap());
        assert!(filter.maybe_contains(ADDRESS));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_no_false_negatives_after_reload() {
        let mut filter = BloomFilter::with_capacity(1000, 0.01).unwrap();
        let members: Vec<String> = (0..500).map(|i| format!("1member{}", i)).collect();
        for member in &members {
            filter.insert(member).unwrap();
        }

        let mut bytes = Vec::new();
        filter.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len() as u64, HEADER_LEN as u64 + filter.num_bits().div_ceil(8));

        let loaded = BloomFilter::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(loaded.len(), filter.len());
        assert_eq!(loaded.capacity(), 1000);
        assert!(members.iter().all(|m| loaded.maybe_contains(m)));

        let false_positives = (0..1000)
            .filter(|i| loaded.maybe_contains(&format!("1outsider{}", i)))
            .count();
        assert!(false_positives < 50, "too many false positives: {}", false_positives);
    }

    #[test]
    fn test_at_capacity() {
        let mut filter = BloomFilter::with_capacity(100, 0.01).unwrap();
        let mut failed = false;
        for i in 0..1000 {
            if let Err(e) = filter.insert(&format!("1key{}", i)) {
                assert!(matches!(e, FilterError::AtCapacity(100)));
                failed = true;
                break;
            }
        }
        assert!(failed);
        assert_eq!(filter.len(), 101);
    }

    #[test]
    fn test_truncated_header() {
        let result = BloomFilter::from_reader(&[0u8; 12][..]);
        assert!(matches!(result, Err(FilterError::TruncatedHeader)));
    }

    #[test]
    fn test_length_mismatch() {
        let filter = BloomFilter::with_capacity(100, 0.01).unwrap();
        let mut bytes = Vec::new();
        filter.write_to(&mut bytes).unwrap();
        bytes.pop();

        let result = BloomFilter::from_reader(bytes.as_slice());
        assert!(matches!(result, Err(FilterError::LengthMismatch { .. })));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(BloomFilter::with_capacity(0, 0.01).is_err());
        assert!(BloomFilter::with_capacity(10, 0.0).is_err());
        assert!(BloomFilter::with_capacity(10, 1.5).is_err());

        let mut header = vec![0u8; HEADER_LEN];
        header[..8].copy_from_slice(&0.01f64.to_le_bytes());
        let result = BloomFilter::from_reader(header.as_slice());
        assert!(matches!(result, Err(FilterError::InvalidParameters(_))));
    }
}
