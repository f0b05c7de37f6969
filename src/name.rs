// URI to content-name translation — pure, no I/O.

use std::fmt;

use url::Url;

use crate::config::{FetchConfig, SECURE_TRANSPORT_PORT};
use crate::error::{FetchError, FetchResult, NetworkErrorKind};
use crate::transport::session::TransportLocator;

/// Hierarchical name addressing a piece of content on the network.
///
/// An ordered sequence of components, printable as a slash-joined path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentName {
    components: Vec<String>,
}

impl ContentName {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Build a name from a slash-separated path, skipping empty components.
    pub fn from_path(path: &str) -> Self {
        Self {
            components: path
                .split('/')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn push(&mut self, component: impl Into<String>) {
        self.components.push(component.into());
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components remaining after `prefix`, or `None` if `prefix` does not
    /// lead this name.
    pub fn strip_prefix(&self, prefix: &ContentName) -> Option<&[String]> {
        if self.components.len() < prefix.components.len() {
            return None;
        }
        if self.components[..prefix.components.len()] != prefix.components[..] {
            return None;
        }
        Some(&self.components[prefix.components.len()..])
    }
}

impl Default for ContentName {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        if self.components.is_empty() {
            write!(f, "/")?;
        }
        Ok(())
    }
}

/// Translate an HTTP-style URI into a transport locator and a content name.
///
/// The host is taken from the URI authority; the configured port selects the
/// secure WebSocket locator (443) or the plain host. The content name joins
/// the configured prefix with the URI path, collapsing the longest overlap
/// between the prefix tail and the leading path components so a path already
/// published under the prefix is not duplicated:
///
/// prefix `/ndn/video` + path `/video/seg1.mp4` -> `/ndn/video/seg1.mp4`
pub fn translate(uri: &str, config: &FetchConfig) -> FetchResult<(TransportLocator, ContentName)> {
    let parsed = Url::parse(uri).map_err(|e| {
        FetchError::network(NetworkErrorKind::Transport, format!("invalid uri {uri}: {e}"))
    })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| {
            FetchError::network(NetworkErrorKind::Transport, format!("uri {uri} has no host"))
        })?
        .to_string();

    let locator = TransportLocator::new(host, config.port, config.port == SECURE_TRANSPORT_PORT);

    let prefix = ContentName::from_path(&config.path_prefix);
    let path = ContentName::from_path(parsed.path());
    Ok((locator, join_under_prefix(&prefix, &path)))
}

/// Join `prefix` and `path`, dropping the longest run of leading path
/// components that already ends the prefix. Deterministic for a fixed prefix.
fn join_under_prefix(prefix: &ContentName, path: &ContentName) -> ContentName {
    let pre = prefix.components();
    let suf = path.components();

    let max_overlap = pre.len().min(suf.len());
    let mut overlap = 0;
    for k in (1..=max_overlap).rev() {
        if pre[pre.len() - k..] == suf[..k] {
            overlap = k;
            break;
        }
    }

    let mut name = ContentName::new();
    for component in pre {
        name.push(component.clone());
    }
    for component in &suf[overlap..] {
        name.push(component.clone());
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(prefix: &str, port: u16) -> FetchConfig {
        FetchConfig {
            path_prefix: prefix.into(),
            telemetry_prefix: format!("{prefix}-stats"),
            port,
            public_ip: "203.0.113.7".into(),
        }
    }

    #[test]
    fn test_translate_secure_locator_and_overlap() {
        let cfg = config("/ndn/video", 443);
        let (locator, name) = translate("https://example.com/video/seg1.mp4", &cfg).unwrap();
        assert_eq!(locator.url(), "wss://example.com/ws/");
        assert_eq!(name.to_string(), "/ndn/video/seg1.mp4");
    }

    #[test]
    fn test_translate_plain_locator() {
        let cfg = config("/ndn/video", 6363);
        let (locator, _) = translate("http://hub.local/video/a.m3u8", &cfg).unwrap();
        assert_eq!(locator.url(), "hub.local");
        assert!(!locator.secure);
    }

    #[test]
    fn test_join_without_overlap_prepends_prefix() {
        let cfg = config("/ndn/video", 443);
        let (_, name) = translate("https://example.com/live/ch3/init.mp4", &cfg).unwrap();
        assert_eq!(name.to_string(), "/ndn/video/live/ch3/init.mp4");
    }

    #[test]
    fn test_join_full_prefix_path_not_duplicated() {
        let cfg = config("/ndn/video", 443);
        let (_, name) = translate("https://example.com/ndn/video/seg2.mp4", &cfg).unwrap();
        assert_eq!(name.to_string(), "/ndn/video/seg2.mp4");
    }

    #[test]
    fn test_translate_is_deterministic() {
        let cfg = config("/ndn/video", 443);
        let a = translate("https://example.com/video/seg1.mp4", &cfg).unwrap();
        let b = translate("https://example.com/video/seg1.mp4", &cfg).unwrap();
        assert_eq!(a.1, b.1);
        assert_eq!(a.0.url(), b.0.url());
    }

    #[test]
    fn test_translate_rejects_hostless_uri() {
        let cfg = config("/ndn/video", 443);
        assert!(translate("not a uri", &cfg).is_err());
    }

    #[test]
    fn test_strip_prefix() {
        let name = ContentName::from_path("/ndn/video/seg1.mp4");
        let prefix = ContentName::from_path("/ndn/video");
        assert_eq!(name.strip_prefix(&prefix).unwrap(), ["seg1.mp4"]);
        let other = ContentName::from_path("/ndn/audio");
        assert!(name.strip_prefix(&other).is_none());
    }
}
