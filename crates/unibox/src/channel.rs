use unibox_m3u::{Entry, Location};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    Url(String),
    Unconfigured,
}

impl From<Location> for Target {
    fn from(value: Location) -> Self {
        match value {
            Location::Url(url) => Self::Url(url),
            Location::Pending => Self::Unconfigured,
        }
    }
}

/// A catalog entry. Channels have no identity of their own: they are addressed by their
/// position in the current snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Channel {
    pub name: String,
    pub target: Target,
}

impl Channel {
    pub fn unconfigured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: Target::Unconfigured,
        }
    }
}

impl From<Entry> for Channel {
    fn from(value: Entry) -> Self {
        Self {
            name: value.name,
            target: value.location.into(),
        }
    }
}
