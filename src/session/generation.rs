//! Request generations for discarding stale responses
//!
//! A view bumps its generation whenever the thing it is showing changes.
//! Requests capture the token current when they were issued; a response is
//! only applied if its token is still current.

/// Token captured when a request is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken(u64);

#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every outstanding token and return the new one
    pub fn advance(&mut self) -> GenerationToken {
        self.current = self.current.wrapping_add(1);
        GenerationToken(self.current)
    }

    pub fn token(&self) -> GenerationToken {
        GenerationToken(self.current)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        token.0 == self.current
    }
}
