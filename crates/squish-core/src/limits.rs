//! Resource limits

/// Ceilings a caller can place on a minification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    /// Reject inputs larger than this many bytes
    pub max_input_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("input of {len} bytes exceeds the {limit} byte limit")]
pub struct LimitExceeded {
    pub len: usize,
    pub limit: usize,
}

impl Limits {
    pub fn check(&self, input: &str) -> Result<(), LimitExceeded> {
        match self.max_input_bytes {
            Some(limit) if input.len() > limit => Err(LimitExceeded {
                len: input.len(),
                limit,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_by_default() {
        assert!(Limits::default().check(&"x".repeat(1 << 20)).is_ok());
    }

    #[test]
    fn test_rejects_oversized_input() {
        let limits = Limits {
            max_input_bytes: Some(4),
        };
        assert!(limits.check("abcd").is_ok());
        assert_eq!(
            limits.check("abcde"),
            Err(LimitExceeded { len: 5, limit: 4 })
        );
    }
}
