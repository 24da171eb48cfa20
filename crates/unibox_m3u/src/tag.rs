use strum::{AsRefStr, EnumIter};

/// Line prefixes recognised in a playlist.
#[derive(AsRefStr, Copy, Clone, Debug, EnumIter, Eq, PartialEq)]
pub enum Tag {
    #[strum(serialize = "#EXTM3U")]
    Header,

    #[strum(serialize = "#EXTINF")]
    Info,

    /// Placeholder for a channel whose stream URL is not known yet.
    #[strum(serialize = "#AGUARDANDO")]
    Pending,
}

impl Tag {
    pub fn matches(self, line: &str) -> bool {
        line.starts_with(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_matches() {
        assert!(Tag::Info.matches("#EXTINF:-1,Channel"));
        assert!(Tag::Pending.matches("#AGUARDANDO"));
        assert!(!Tag::Info.matches("#EXTM3U"));
    }

    #[test]
    fn test_prefixes_are_disjoint() {
        for a in Tag::iter() {
            for b in Tag::iter().filter(|b| *b != a) {
                assert!(!b.matches(a.as_ref()), "{a:?} is shadowed by {b:?}");
            }
        }
    }
}
