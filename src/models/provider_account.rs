use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A linked external-service identity, keyed by (provider, id).
///
/// Everything besides the key is provider specific and kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAccount {
    pub provider: String,
    #[serde(deserialize_with = "deserialize_account_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ProviderAccount {
    /// Build an account from a request payload. The route key wins over any
    /// `provider`/`id` the payload carries.
    pub fn from_payload(provider: &str, id: &str, mut payload: Map<String, Value>) -> Self {
        payload.remove("provider");
        payload.remove("id");

        Self {
            provider: provider.to_string(),
            id: id.to_string(),
            fields: payload,
        }
    }

    pub fn matches(&self, provider: &str, id: &str) -> bool {
        self.provider == provider && self.id == id
    }
}

/// Provider ids arrive as strings from routes but as numbers from some
/// provider payloads (github). Both normalize to the decimal string.
fn deserialize_account_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Outcome of [`ProviderAccounts::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Replaced(usize),
    Appended,
}

/// Ordered sequence of a user's provider accounts.
///
/// Operations never mutate the sequence they are called on; they hand back a
/// new one so the caller decides when (and whether) it replaces the stored
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderAccounts(Vec<ProviderAccount>);

impl ProviderAccounts {
    pub fn new(accounts: Vec<ProviderAccount>) -> Self {
        Self(accounts)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProviderAccount> {
        self.0.iter()
    }

    pub fn find(&self, provider: &str, id: &str) -> Option<&ProviderAccount> {
        self.0.iter().find(|account| account.matches(provider, id))
    }

    /// Replace the first entry with the same key, or append when there is none.
    pub fn upsert(&self, account: ProviderAccount) -> (Self, Upsert) {
        let mut accounts = self.0.clone();

        match accounts
            .iter()
            .position(|existing| existing.matches(&account.provider, &account.id))
        {
            Some(index) => {
                accounts[index] = account;
                (Self(accounts), Upsert::Replaced(index))
            }
            None => {
                accounts.push(account);
                (Self(accounts), Upsert::Appended)
            }
        }
    }

    /// Drop every entry with the given key. Returns the remaining sequence and
    /// how many entries were removed.
    pub fn remove_all(&self, provider: &str, id: &str) -> (Self, usize) {
        let remaining: Vec<ProviderAccount> = self
            .0
            .iter()
            .filter(|account| !account.matches(provider, id))
            .cloned()
            .collect();
        let removed = self.0.len() - remaining.len();

        (Self(remaining), removed)
    }
}
