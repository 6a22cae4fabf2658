//! Per call-site mapping from client model keys to backend model ids

use log::debug;

pub const FLASH_MODEL: &str = "models/gemini-2.5-flash";
pub const GENERATION_PRO_MODEL: &str = "models/gemini-3-flash-preview";
pub const HUMANIZATION_PRO_MODEL: &str = "models/gemini-2.5-pro";

/// Immutable, ordered registry of model keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistry
{   entries: Vec<(String, String)>
}

impl ModelRegistry
{   /// Create a registry from `(key, backend model id)` pairs
    pub fn new<K, M>(entries: impl IntoIterator<Item = (K, M)>) -> Self
    where
      K: Into<String>
    , M: Into<String>
    {   let entries: Vec<(String, String)> = entries
          .into_iter()
          .map(|(k, m)| (k.into(), m.into()))
          .collect();
        debug!("Creating model registry with {} keys", entries.len());
        ModelRegistry { entries }
    }

    /// Registry used by plain generation
    pub fn generation() -> Self
    {   ModelRegistry::new([
          ("flash", FLASH_MODEL)
        , ("pro", GENERATION_PRO_MODEL)
        ])
    }

    /// Registry used by humanization
    pub fn humanization() -> Self
    {   ModelRegistry::new([
          ("flash", FLASH_MODEL)
        , ("pro", HUMANIZATION_PRO_MODEL)
        ])
    }

    /// Resolve a key to its backend model id
    pub fn resolve(&self, key: &str)
      -> Result<&str, crate::error::Error>
    {   self.entries
          .iter()
          .find(|(k, _)| k == key)
          .map(|(_, model)| model.as_str())
          .ok_or_else(|| crate::error::Error::InvalidModelKey
          {   key: key.to_string()
            , allowed: self.allowed_keys()
          })
    }

    /// Keys accepted by this registry, in registration order
    pub fn allowed_keys(&self) -> Vec<String>
    {   self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::error::Error;

    #[test]
    fn resolves_known_keys()
    {   let registry = ModelRegistry::generation();
        assert_eq!(registry.resolve("flash"), Ok(FLASH_MODEL));
        assert_eq!(registry.resolve("pro"), Ok(GENERATION_PRO_MODEL));
    }

    #[test]
    fn pro_differs_between_call_sites()
    {   let generation = ModelRegistry::generation();
        let humanization = ModelRegistry::humanization();
        assert_ne!(
          generation.resolve("pro"),
          humanization.resolve("pro")
        );
        assert_eq!(
          generation.resolve("flash"),
          humanization.resolve("flash")
        );
    }

    #[test]
    fn unknown_key_reports_exact_allowed_set()
    {   let registry = ModelRegistry::new([
          ("fast", "m/a")
        , ("slow", "m/b")
        , ("mid", "m/c")
        ]);
        match registry.resolve("FLASH")
        {   Err(Error::InvalidModelKey { key, allowed }) => {
              assert_eq!(key, "FLASH");
              assert_eq!(allowed, vec!["fast", "slow", "mid"]);
            }
          , other => panic!("unexpected: {:?}", other)
        }
    }
}
