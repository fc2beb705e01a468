//! core::source
//!
//! Parsing of user-supplied source strings.
//!
//! # Grammar
//!
//! ```text
//! [host-prefix/]owner/name[/subpath...][#ref]
//! ```
//!
//! `host-prefix` is either a domain-like token (`github.com/`,
//! `https://gitlab.com/`), an SSH form (`git@bitbucket.org:`) or a bare site
//! name followed by a colon (`gitlab:`). When no host is given the default
//! host (GitHub unless configured otherwise) is used.
//!
//! # Normalization
//!
//! - A trailing `.com`/`.org` is stripped from the host before it is matched
//!   against the supported set.
//! - A trailing `.git` is stripped from the repository name.
//! - A missing `#ref` means the remote's default branch (`HEAD`).
//!
//! # Example
//!
//! ```
//! use ghat::core::source::{Host, SourceDescriptor};
//!
//! let source = SourceDescriptor::parse("fregante/ghatemplates/node#main").unwrap();
//! assert_eq!(source.host, Host::GitHub);
//! assert_eq!(source.owner, "fregante");
//! assert_eq!(source.name, "ghatemplates");
//! assert_eq!(source.subpath.as_deref(), Some("node"));
//! assert_eq!(source.git_ref, "main");
//! assert_eq!(source.url, "https://github.com/fregante/ghatemplates");
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Ref used when the source string does not name one.
pub const DEFAULT_REF: &str = "HEAD";

/// Errors from source parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("could not parse {0}")]
    BadSource(String),

    #[error("unsupported host: {0}")]
    UnsupportedHost(String),
}

/// Supported remote hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Host {
    #[default]
    GitHub,
    GitLab,
    Bitbucket,
    SourceHut,
}

impl Host {
    /// All supported hosts.
    pub fn all() -> &'static [Host] {
        &[Host::GitHub, Host::GitLab, Host::Bitbucket, Host::SourceHut]
    }

    /// Site name as it appears in source strings and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Host::GitHub => "github",
            Host::GitLab => "gitlab",
            Host::Bitbucket => "bitbucket",
            Host::SourceHut => "git.sr.ht",
        }
    }

    /// Domain used to build canonical URLs.
    pub fn domain(&self) -> &'static str {
        match self {
            Host::GitHub => "github.com",
            Host::GitLab => "gitlab.com",
            Host::Bitbucket => "bitbucket.org",
            Host::SourceHut => "git.sr.ht",
        }
    }

    /// Parse a site name, accepting the full domain as well.
    ///
    /// ```
    /// use ghat::core::source::Host;
    ///
    /// assert_eq!(Host::parse("github"), Some(Host::GitHub));
    /// assert_eq!(Host::parse("bitbucket.org"), Some(Host::Bitbucket));
    /// assert_eq!(Host::parse("example"), None);
    /// ```
    pub fn parse(site: &str) -> Option<Self> {
        let site = site.to_lowercase();
        let site = strip_tld(&site);
        Host::all().iter().copied().find(|host| host.name() == site)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Structured form of a source string.
///
/// Immutable and derived solely from the input string (plus the default host
/// when the string does not name one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Remote host
    pub host: Host,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name, without `.git`
    pub name: String,
    /// Ref to check out; [`DEFAULT_REF`] for the default branch
    pub git_ref: String,
    /// Path inside the repository, without leading or trailing slashes
    pub subpath: Option<String>,
    /// Canonical web URL of the repository
    pub url: String,
}

impl SourceDescriptor {
    /// Parse a source string, defaulting to GitHub when no host is given.
    pub fn parse(source: &str) -> Result<Self, SourceError> {
        Self::parse_with_default_host(source, Host::GitHub)
    }

    /// Parse a source string, using `default_host` when no host is given.
    pub fn parse_with_default_host(source: &str, default_host: Host) -> Result<Self, SourceError> {
        let captures = source_pattern()
            .captures(source)
            .ok_or_else(|| SourceError::BadSource(source.to_string()))?;

        let host = match captures
            .get(1)
            .or_else(|| captures.get(2))
            .or_else(|| captures.get(3))
        {
            Some(site) => {
                let normalized = site.as_str().to_lowercase();
                let normalized = strip_tld(&normalized);
                Host::parse(normalized)
                    .ok_or_else(|| SourceError::UnsupportedHost(normalized.to_string()))?
            }
            None => default_host,
        };

        // Groups 4 and 5 are mandatory in the pattern.
        let owner = captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| SourceError::BadSource(source.to_string()))?;
        let raw_name = captures
            .get(5)
            .map(|m| m.as_str())
            .ok_or_else(|| SourceError::BadSource(source.to_string()))?;
        let name = raw_name.strip_suffix(".git").unwrap_or(raw_name).to_string();

        let subpath = captures
            .get(6)
            .map(|m| m.as_str().trim_matches('/').to_string())
            .filter(|s| !s.is_empty());
        let git_ref = captures
            .get(7)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_REF.to_string());

        let url = format!("https://{}/{}/{}", host.domain(), owner, name);

        Ok(Self {
            host,
            owner,
            name,
            git_ref,
            subpath,
            url,
        })
    }

    /// Whether the source asks for the remote's default branch.
    pub fn is_default_ref(&self) -> bool {
        self.git_ref == DEFAULT_REF
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)?;
        if let Some(subpath) = &self.subpath {
            write!(f, "/{}", subpath)?;
        }
        if !self.is_default_ref() {
            write!(f, "#{}", self.git_ref)?;
        }
        Ok(())
    }
}

fn source_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:(?:https://)?([^:/]+\.[^:/]+)/|git@([^:/]+)[:/]|([^/]+):)?([^/\s]+)/([^/\s#]+)(?:((?:/[^/\s#]+)+))?/?(?:#(.+))?",
        )
        .expect("source pattern is a valid regex")
    })
}

fn strip_tld(site: &str) -> &str {
    site.strip_suffix(".com")
        .or_else(|| site.strip_suffix(".org"))
        .unwrap_or(site)
}
