use uuid::Uuid;

/// Strongly typed ID for media records
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MediaId(pub Uuid);

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaId {
    /// Time-ordered, so sorting by id approximates creation order.
    pub fn new() -> Self {
        MediaId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for MediaId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for MediaId {
    fn from(value: Uuid) -> Self {
        MediaId(value)
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
