use crate::FieldError;

/// A single key-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

/// Ordered key-value list, used for headers, cookies, and form fields.
///
/// Insertion order is preserved and lookups are first-match, with case-sensitive key comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairs {
    pairs: Vec<Pair>,
}

impl Pairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Pair> {
        self.pairs.iter()
    }

    /// Add a pair, merging into an existing key.
    ///
    /// If `key` is already present, `value` is appended to the existing value separated by `,`.
    /// Otherwise a new pair is added at the tail.
    pub fn add(&mut self, key: &str, value: &str) {
        match self.find_mut(key) {
            Some(pair) => {
                pair.value.push(',');
                pair.value.push_str(value);
            }
            None => self.append(key, value),
        }
    }

    /// Append a pair at the tail, even if the key is already present.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push(Pair {
            key: key.into(),
            value: value.into(),
        });
    }

    /// First pair with the given key.
    pub fn find(&self, key: &str) -> Option<&Pair> {
        self.pairs.iter().find(|pair| pair.key == key)
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut Pair> {
        self.pairs.iter_mut().find(|pair| pair.key == key)
    }

    /// Value of the first pair with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key).map(|pair| pair.value.as_str())
    }

    /// Remove the first pair with the given key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|pair| pair.key == key)?;
        Some(self.pairs.remove(index).value)
    }

    /// Look up the values of several keys at once.
    ///
    /// Every key has to be present. With `exact`, the list also may not contain pairs beyond the
    /// requested ones.
    pub fn fields<const N: usize>(
        &self,
        keys: [&str; N],
        exact: bool,
    ) -> Result<[&str; N], FieldError> {
        let mut values = [""; N];

        for (value, key) in values.iter_mut().zip(keys) {
            *value = self
                .get(key)
                .ok_or_else(|| FieldError::MissingKey(key.to_string()))?;
        }

        if exact && self.len() != N {
            return Err(FieldError::ExtraPairs);
        }

        Ok(values)
    }
}

impl<'a> IntoIterator for &'a Pairs {
    type Item = &'a Pair;
    type IntoIter = std::slice::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Pairs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs = Pairs::new();
        for (key, value) in iter {
            pairs.append(key, value);
        }
        pairs
    }
}
