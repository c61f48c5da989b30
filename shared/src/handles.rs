use serde::{Deserialize, Serialize};

use crate::Provider;

pub type Handle = String;

/// Per-provider handles linked to an account. Empty strings mean "not linked".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderHandles {
    #[serde(default)]
    pub leetcode: Handle,
    #[serde(default)]
    pub codeforces: Handle,
    #[serde(default)]
    pub github: Handle,
}

impl ProviderHandles {
    pub fn get(&self, provider: Provider) -> &str {
        match provider {
            Provider::LeetCode => &self.leetcode,
            Provider::Codeforces => &self.codeforces,
            Provider::Github => &self.github,
        }
    }

    /// Handle to query for `provider`: the linked handle, or the account username
    /// when nothing is linked.
    pub fn effective<'a>(&'a self, provider: Provider, username: &'a str) -> &'a str {
        let handle = self.get(provider).trim();
        if handle.is_empty() {
            username.trim()
        } else {
            handle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_username() {
        let handles = ProviderHandles {
            leetcode: "lc_name".to_string(),
            codeforces: "   ".to_string(),
            github: String::new(),
        };

        assert_eq!(handles.effective(Provider::LeetCode, "alice"), "lc_name");
        assert_eq!(handles.effective(Provider::Codeforces, "alice"), "alice");
        assert_eq!(handles.effective(Provider::Github, "alice"), "alice");
    }

    #[test]
    fn empty_when_nothing_known() {
        let handles = ProviderHandles::default();
        assert_eq!(handles.effective(Provider::Github, ""), "");
    }
}
