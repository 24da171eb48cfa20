use tracing::trace;

use crate::tag::Tag;

/// Where a playlist entry points to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Location {
    Url(String),

    /// The playlist lists the channel but marks its stream as not assigned yet.
    Pending,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub name: String,
    pub location: Location,
}

/// Parses an extended M3U document into its entries, in document order.
///
/// An entry is an `#EXTINF` line followed (not necessarily immediately) by
/// either a URL line or a `#AGUARDANDO` marker. The name is the last
/// comma-separated field of the `#EXTINF` line. Anything that does not fit
/// this shape is skipped, so the result may be empty but never an error.
pub fn parse(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut pending_name: Option<String> = None;

    for line in text.lines().map(str::trim) {
        if Tag::Info.matches(line) {
            let fields = line.split(',').collect::<Vec<_>>();

            // Without a comma there is no name field; keep whatever was pending.
            if let [_, .., last] = fields.as_slice() {
                let name = last.trim();
                pending_name = (!name.is_empty()).then(|| name.to_string());
            }

            continue;
        }

        let location = if Tag::Pending.matches(line) {
            Location::Pending
        } else if line.starts_with("http") {
            Location::Url(line.to_string())
        } else {
            continue;
        };

        let Some(name) = pending_name.take() else {
            trace!(line, "Skipping a location without a preceding name");
            continue;
        };

        entries.push(Entry { name, location });
    }

    entries
}
