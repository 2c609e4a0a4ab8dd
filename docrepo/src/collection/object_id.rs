use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::ID_GENERATOR;
use chrono::{DateTime, Utc};
use log::info;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

const COUNTER_MASK: u32 = 0x00ff_ffff;

/// A 12-byte document identifier, the native identifier of document stores.
///
/// # Layout
///
/// - bytes 0..4: seconds since the Unix epoch, big-endian
/// - bytes 4..9: random value chosen once per process
/// - bytes 9..12: counter, big-endian, starting at a random value
///
/// Ids generated by one process are therefore ordered by creation time, and ids
/// from different processes do not collide.
///
/// # Text form
///
/// An `ObjectId` prints as 24 lowercase hex digits and parses back from the
/// same form. Anything else fails to parse with [ErrorKind::InvalidId].
///
/// ```rust
/// use docrepo::collection::ObjectId;
///
/// let id = ObjectId::new();
/// let parsed: ObjectId = id.to_hex().parse().unwrap();
/// assert_eq!(id, parsed);
/// assert!("not-an-id".parse::<ObjectId>().is_err());
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    /// Generates a new unique `ObjectId`.
    pub fn new() -> Self {
        ID_GENERATOR.next_id()
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId { bytes }
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Creation time encoded in the id, with second precision.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
        DateTime::<Utc>::from_timestamp(seconds as i64, 0).unwrap_or_default()
    }

    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parses the 24 hex digit text form.
    pub fn parse_str(s: &str) -> DocRepoResult<ObjectId> {
        // from_str_radix alone would let signs through
        if s.len() != 24 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            log::error!("'{}' is not a valid 24 digit hex string", s);
            return Err(DocRepoError::new(
                &format!("'{}' is not a valid 24 digit hex string", s),
                ErrorKind::InvalidId,
            ));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| {
                DocRepoError::new(
                    &format!("'{}' is not a valid 24 digit hex string", s),
                    ErrorKind::InvalidId,
                )
            })?;
        }
        Ok(ObjectId { bytes })
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl FromStr for ObjectId {
    type Err = DocRepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

/// Generates [ObjectId]s for this process.
pub(crate) struct ObjectIdGenerator {
    process_unique: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        let mut process_unique = [0u8; 5];
        OsRng.fill_bytes(&mut process_unique);
        let counter = OsRng.gen_range(0..=COUNTER_MASK);
        info!("Initialized object id generator");

        ObjectIdGenerator {
            process_unique,
            counter: AtomicU32::new(counter),
        }
    }

    pub fn next_id(&self) -> ObjectId {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let counter = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        ObjectId { bytes }
    }
}
