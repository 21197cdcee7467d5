use crate::{
    config::SyncConfig,
    domain::item::{ClipboardItem, ItemId},
    error::{Result, SyncError},
    store::path::is_valid_segment,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Identifier of a shared board, also its URL path segment and store key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoardKey(String);

impl BoardKey {
    /// Generates `<prefix><digits>` with a non-zero leading digit, e.g. `naw48213`
    ///
    /// Fails with [`SyncError::ConfigError`] when the prefix or digit count is invalid.
    pub fn generate(config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        let low = 10u64.pow(config.key_digits - 1);
        let span = 9 * low;
        let random = (Uuid::new_v4().as_u128() % u128::from(span)) as u64;
        Self::try_from(format!("{}{}", config.key_prefix, low + random))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BoardKey {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        if is_valid_segment(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(SyncError::InvalidBoardKey(s.to_string()))
        }
    }
}

impl TryFrom<String> for BoardKey {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self> {
        if is_valid_segment(&value) {
            Ok(Self(value))
        } else {
            Err(SyncError::InvalidBoardKey(value))
        }
    }
}

impl From<BoardKey> for String {
    fn from(key: BoardKey) -> Self {
        key.0
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of reading a board key from a page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyResolution {
    pub key: BoardKey,
    /// Path the current history entry must be replaced with, set when the key was generated
    pub replace_url: Option<String>,
}

impl KeyResolution {
    pub fn is_generated(&self) -> bool {
        self.replace_url.is_some()
    }
}

/// Picks the board key out of a URL path
///
/// The last non-empty segment is the key. When there is none, or it is not a
/// valid key, a fresh key is generated and the caller is told to rewrite the
/// URL to `/<key>`. Generation fails only when `config` is invalid.
pub fn resolve_board_key(url_path: &str, config: &SyncConfig) -> Result<KeyResolution> {
    let path = url_path.split(['?', '#']).next().unwrap_or_default();

    let existing = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .and_then(|segment| segment.parse::<BoardKey>().ok());

    match existing {
        Some(key) => Ok(KeyResolution {
            key,
            replace_url: None,
        }),
        None => {
            let key = BoardKey::generate(config)?;
            let replace_url = Some(format!("/{}", key));
            Ok(KeyResolution { key, replace_url })
        }
    }
}

/// Shareable URL for a board, e.g. `https://example.com/naw12345`
pub fn share_link(origin: &str, key: &BoardKey) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), key)
}

/// A board together with its items, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub key: BoardKey,
    pub items: Vec<ClipboardItem>,
}

impl Board {
    pub fn new(key: BoardKey) -> Self {
        Self {
            key,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &ItemId) -> Option<&ClipboardItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_key_validation() {
        assert!("abc-def".parse::<BoardKey>().is_ok());
        assert!("naw12345".parse::<BoardKey>().is_ok());

        for bad in ["", "abc.def", "a#b", "a$b", "a[b", "a]b", "a/b"] {
            assert!(
                matches!(bad.parse::<BoardKey>(), Err(SyncError::InvalidBoardKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_generated_key_shape() {
        let config = SyncConfig::default();
        for _ in 0..100 {
            let key = BoardKey::generate(&config).unwrap();
            let digits = key.as_str().strip_prefix("naw").unwrap();
            assert_eq!(digits.len(), 5);
            let number: u32 = digits.parse().unwrap();
            assert!((10_000..=99_999).contains(&number));
        }
    }

    #[test]
    fn test_generated_key_respects_config() {
        let config = SyncConfig {
            key_prefix: "b".to_string(),
            key_digits: 1,
            ..SyncConfig::default()
        };
        let key = BoardKey::generate(&config).unwrap();
        assert_eq!(key.as_str().len(), 2);
        assert!(key.as_str().starts_with('b'));
        assert_ne!(&key.as_str()[1..], "0");
    }

    #[test]
    fn test_resolve_accepts_valid_segment() {
        let config = SyncConfig::default();
        let resolution = resolve_board_key("/abc-def", &config).unwrap();
        assert_eq!(resolution.key.as_str(), "abc-def");
        assert!(!resolution.is_generated());

        let resolution = resolve_board_key("/boards/naw12345/?tab=1#top", &config).unwrap();
        assert_eq!(resolution.key.as_str(), "naw12345");
        assert_eq!(resolution.replace_url, None);
    }

    #[test]
    fn test_resolve_generates_on_invalid_or_missing() {
        let config = SyncConfig::default();
        for path in ["/abc.def", "/", "", "/a$b"] {
            let resolution = resolve_board_key(path, &config).unwrap();
            assert!(resolution.is_generated(), "{path:?} should fall back");
            assert!(resolution.key.as_str().starts_with("naw"));
            assert_eq!(
                resolution.replace_url,
                Some(format!("/{}", resolution.key))
            );
        }
    }

    #[test]
    fn test_generate_rejects_invalid_config() {
        let bad_prefix = SyncConfig {
            key_prefix: "a.b".to_string(),
            ..SyncConfig::default()
        };
        assert!(matches!(
            BoardKey::generate(&bad_prefix),
            Err(SyncError::ConfigError(_))
        ));
        assert!(matches!(
            resolve_board_key("/", &bad_prefix),
            Err(SyncError::ConfigError(_))
        ));

        let bad_digits = SyncConfig {
            key_digits: 12,
            ..SyncConfig::default()
        };
        assert!(matches!(
            BoardKey::generate(&bad_digits),
            Err(SyncError::ConfigError(_))
        ));
    }

    #[test]
    fn test_resolve_valid_key_ignores_config() {
        let bad_prefix = SyncConfig {
            key_prefix: "a.b".to_string(),
            ..SyncConfig::default()
        };
        let resolution = resolve_board_key("/naw12345", &bad_prefix).unwrap();
        assert_eq!(resolution.key.as_str(), "naw12345");
    }

    #[test]
    fn test_generated_key_reparses() {
        let config = SyncConfig::default();
        let resolution = resolve_board_key("/abc.def", &config).unwrap();
        let reparsed: BoardKey = resolution.key.as_str().parse().unwrap();
        assert_eq!(reparsed, resolution.key);

        let rewritten = resolution.replace_url.as_deref().unwrap();
        let again = resolve_board_key(rewritten, &config).unwrap();
        assert!(!again.is_generated());
        assert_eq!(again.key, resolution.key);
    }

    #[test]
    fn test_share_link() {
        let key: BoardKey = "naw12345".parse().unwrap();
        assert_eq!(
            share_link("https://syncboard.app/", &key),
            "https://syncboard.app/naw12345"
        );
        assert_eq!(
            share_link("http://localhost:5173", &key),
            "http://localhost:5173/naw12345"
        );
    }

    #[test]
    fn test_board_key_serde() {
        let key: BoardKey = serde_json::from_str("\"naw12345\"").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"naw12345\"");
        assert!(serde_json::from_str::<BoardKey>("\"bad.key\"").is_err());
    }

    #[test]
    fn test_board_lookup() {
        let mut board = Board::new("naw12345".parse().unwrap());
        assert!(board.is_empty());

        let item = ClipboardItem::new("k1".parse().unwrap(), "hello".to_string());
        board.items.push(item.clone());
        assert_eq!(board.len(), 1);
        assert_eq!(board.find(&item.id), Some(&item));
        assert_eq!(board.find(&"k2".parse().unwrap()), None);
    }
}
