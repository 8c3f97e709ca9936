//! API credential wrapper.

use std::fmt;

/// Keys at or below this length are treated as placeholders.
const MIN_PLAUSIBLE_KEY_LEN: usize = 10;

/// An opaque API key.
///
/// The secret is only reachable through [`Credential::expose`]; `Debug`
/// output is redacted so a credential can sit inside logged structs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// An empty credential. Requests made with it fail at the server.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no secret is held.
    ///
    /// Only the empty string counts; a whitespace key is still sent as given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the key looks long enough to be worth trying.
    ///
    /// Purely advisory: nothing in the request path rejects a key based on
    /// this check.
    pub fn is_plausible(&self) -> bool {
        self.0.trim().len() > MIN_PLAUSIBLE_KEY_LEN
    }

    /// Treats an empty credential the same as an absent one.
    pub(crate) fn non_empty(credential: Option<&Credential>) -> Option<&Credential> {
        credential.filter(|c| !c.is_empty())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

impl From<String> for Credential {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self(secret.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let cred = Credential::new("AIzaSyTopSecret");
        let shown = format!("{:?}", cred);
        assert!(!shown.contains("TopSecret"));
        assert_eq!(shown, "Credential(<redacted>)");
        assert_eq!(format!("{:?}", Credential::empty()), "Credential(<empty>)");
    }

    #[test]
    fn test_plausibility() {
        assert!(Credential::new("AIzaSyTopSecret").is_plausible());
        assert!(!Credential::new("short").is_plausible());
        assert!(!Credential::new("   0123456789   ").is_plausible());
    }

    #[test]
    fn test_non_empty_filters_only_empty_string() {
        assert!(Credential::non_empty(Some(&Credential::empty())).is_none());
        assert!(Credential::non_empty(None).is_none());

        let spaces = Credential::new("  ");
        assert_eq!(Credential::non_empty(Some(&spaces)), Some(&spaces));

        let real = Credential::new("abc");
        assert_eq!(Credential::non_empty(Some(&real)), Some(&real));
    }
}
