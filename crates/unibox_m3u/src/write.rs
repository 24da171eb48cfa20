use crate::tag::Tag;

/// One channel as written into an exported playlist.
#[derive(Clone, Debug)]
pub struct ExportEntry<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub logo: Option<&'a str>,
    pub group: Option<&'a str>,
}

/// Renders entries as an extended M3U document readable by common IPTV players.
pub fn write_playlist<'a>(entries: impl IntoIterator<Item = ExportEntry<'a>>) -> String {
    let header = format!("{}\n", Tag::Header.as_ref());

    entries.into_iter().fold(header, |mut out, entry| {
        out.push_str(&format!(
            "{}:-1 tvg-id=\"\" tvg-name=\"{}\" tvg-logo=\"{}\" group-title=\"{}\",{}\n{}\n",
            Tag::Info.as_ref(),
            attribute(entry.name),
            attribute(entry.logo.unwrap_or_default()),
            attribute(entry.group.unwrap_or_default()),
            entry.name.trim(),
            entry.url,
        ));
        out
    })
}

fn attribute(value: &str) -> String {
    value.trim().replace('"', "'")
}
