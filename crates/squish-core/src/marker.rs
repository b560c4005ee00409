//! Run-unique marker prefixes

use rapidhash::fast::RapidHasher;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Bumped for every marker handed out by this process
static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Letters only, so markers never look like numbers, hex colors or units
const ALPHABET: &[u8; 16] = b"BCDFGHJKLMNPQRST";

/// Prefix shared by every marker
const LEAD: &str = "SQZ";

/// A prefix that is unique to one minification run.
///
/// Tokens built from a marker look like `___SQZ<16 letters><kind><id>___`.
/// The trailing underscores keep `T1` from matching the front of `T12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    prefix: String,
}

impl Marker {
    /// Generate a marker whose prefix does not occur anywhere in `input`
    pub fn for_input(label: &str, input: &str) -> Self {
        loop {
            let marker = Self::generate(label);
            if !input.contains(&marker.prefix) {
                return marker;
            }
            tracing::trace!(label, "marker collided with input, regenerating");
        }
    }

    fn generate(label: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let mut hasher = RapidHasher::default();
        hasher.write_u64(RUN_COUNTER.fetch_add(1, Ordering::Relaxed));
        hasher.write_u64(nanos);
        hasher.write(label.as_bytes());
        let mut hash = hasher.finish();

        let mut prefix = String::with_capacity(LEAD.len() + 16);
        prefix.push_str(LEAD);
        for _ in 0..16 {
            prefix.push(ALPHABET[(hash & 0xf) as usize] as char);
            hash >>= 4;
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A numbered token, e.g. the 3rd comment or the 12th preserved string
    pub fn token(&self, kind: &str, id: usize) -> String {
        format!("___{}{kind}{id}___", self.prefix)
    }

    /// An un-numbered token used as a single-purpose sentinel
    pub fn label(&self, kind: &str) -> String {
        format!("___{}{kind}___", self.prefix)
    }
}
