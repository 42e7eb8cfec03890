use rustc_hash::FxHashSet;

/// Tells the encounter what kind of item was presented.
pub trait EvidenceCatalog {
    /// Profiles are people rather than objects and get their own
    /// wrong-evidence reaction.
    fn is_profile(&self, id: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    profiles: FxHashSet<String>,
}

impl ProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, id: impl Into<String>) -> Self {
        self.profiles.insert(id.into());
        self
    }
}

impl<S: Into<String>> FromIterator<S> for ProfileSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl EvidenceCatalog for ProfileSet {
    fn is_profile(&self, id: &str) -> bool {
        self.profiles.contains(id)
    }
}
