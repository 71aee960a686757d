//! # Authentication Exemption Matcher
//!
//! Decides, per request path, whether the auth middleware skips
//! verification. The table is built once at startup from path literals and
//! consulted on every request; matching is pure string comparison with no
//! clock, no state, no allocation on the hot path.
//!
//! ## Matching rules
//!
//! - `/` is exact-only. It never acts as a prefix — otherwise every path
//!   would be exempt.
//! - A literal ending in `/` is a prefix rule: `/static/` matches
//!   `/static/logo.png` and `/static/` itself.
//! - Any other literal is an exact rule that also covers its subtree:
//!   `/docs` matches `/docs` and `/docs/oauth2-redirect`, but not
//!   `/docsearch`.
//! - First match wins; rules are checked in table order.

/// A single exemption rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExemptPath {
    /// Matches the path itself, and the subtree under it (except for `/`).
    Exact(String),
    /// Matches any path starting with the literal (which ends in `/`).
    Prefix(String),
}

impl ExemptPath {
    /// Classify a path literal: a trailing `/` makes it a prefix rule,
    /// anything else an exact rule. The root `/` is exact.
    pub fn from_literal(literal: &str) -> Self {
        if literal != "/" && literal.ends_with('/') {
            Self::Prefix(literal.to_string())
        } else {
            Self::Exact(literal.to_string())
        }
    }

    /// Whether `path` matches this rule.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(e) if e == "/" => path == "/",
            Self::Exact(e) => {
                path == e || (path.len() > e.len() && path.starts_with(e.as_str()) && path.as_bytes()[e.len()] == b'/')
            }
            Self::Prefix(p) => path.starts_with(p.as_str()),
        }
    }
}

/// Ordered exemption table, built once at startup.
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    rules: Vec<ExemptPath>,
}

impl ExemptPaths {
    /// Build a table from path literals, preserving order.
    pub fn new<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = literals
            .into_iter()
            .map(|l| ExemptPath::from_literal(l.as_ref()))
            .collect();
        Self { rules }
    }

    /// The default exemption table for the agent service.
    ///
    /// The agent description (`/agents/test/ad.json`) is deliberately
    /// absent: fetching it requires authentication.
    pub fn default_table() -> Self {
        Self::new([
            "/",
            "/health",
            "/v1/status",
            "/docs",
            "/redoc",
            "/openapi.json",
            "/favicon.ico",
            "/metrics",
            "/static/",
            "/wba/user/",
            "/v1/chat",
        ])
    }

    /// Whether `path` (no query string) is exempt from authentication.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(path))
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
