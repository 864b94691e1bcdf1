use crate::models::Stream;

/// Serializes an ordered, already-filtered stream list as extended M3U8 text.
///
/// The emitter performs no reordering and no deduplication; entries appear
/// exactly in the order handed in. `tvg-name`, `tvg-chno` and `tvg-type` are
/// always present, the remaining attributes only when the source field is
/// non-empty. An empty input still yields the bare `#EXTM3U` header.
pub fn emit_playlist(streams: &[Stream]) -> String {
    let mut m3u = String::from("#EXTM3U\n");

    for stream in streams {
        let mut extinf = format!(
            "#EXTINF:-1 tvg-name=\"{}\" tvg-chno=\"{}\" tvg-type=\"{}\"",
            stream.name,
            stream.channel_number,
            stream.stream_type.code()
        );

        if let Some(group) = non_empty(&stream.tvg_group) {
            extinf.push_str(&format!(" tvg-group=\"{}\"", group));
            extinf.push_str(&format!(" group-title=\"{}\"", group));
        }
        if let Some(tvg_id) = non_empty(&stream.tvg_id) {
            extinf.push_str(&format!(" tvg-id=\"{}\"", tvg_id));
        }
        if let Some(tvg_logo) = non_empty(&stream.tvg_logo) {
            extinf.push_str(&format!(" tvg-logo=\"{}\"", tvg_logo));
        }

        extinf.push_str(&format!(", {}\n", stream.name));
        m3u.push_str(&extinf);
        m3u.push_str(&stream.stream_url);
        m3u.push('\n');
    }

    m3u
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StreamCategory, StreamType};
    use chrono::Utc;
    use uuid::Uuid;

    fn stream(name: &str, url: &str) -> Stream {
        Stream {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider_id: None,
            stream_type: StreamType::Live,
            is_active: true,
            category: StreamCategory::Main,
            channel_number: String::new(),
            name: name.to_string(),
            original_name: name.to_string(),
            stream_url: url.to_string(),
            tvg_id: None,
            tvg_group: None,
            tvg_logo: None,
            extras: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_emits_bare_header() {
        assert_eq!(emit_playlist(&[]), "#EXTM3U\n");
    }

    #[test]
    fn minimal_stream_emits_mandatory_attributes_only() {
        let output = emit_playlist(&[stream("News 24", "http://x/2")]);
        assert_eq!(
            output,
            "#EXTM3U\n\
             #EXTINF:-1 tvg-name=\"News 24\" tvg-chno=\"\" tvg-type=\"0\", News 24\n\
             http://x/2\n"
        );
    }

    #[test]
    fn optional_attributes_emitted_only_when_non_empty() {
        let mut s = stream("Movies One", "http://x/7");
        s.stream_type = StreamType::Vod;
        s.channel_number = "101".to_string();
        s.tvg_group = Some("Movies".to_string());
        s.tvg_id = Some("movies.one".to_string());
        s.tvg_logo = Some("http://x/logo.png".to_string());

        let output = emit_playlist(&[s]);
        assert_eq!(
            output,
            "#EXTM3U\n\
             #EXTINF:-1 tvg-name=\"Movies One\" tvg-chno=\"101\" tvg-type=\"4\" \
             tvg-group=\"Movies\" group-title=\"Movies\" tvg-id=\"movies.one\" \
             tvg-logo=\"http://x/logo.png\", Movies One\n\
             http://x/7\n"
        );
    }

    #[test]
    fn empty_string_fields_are_treated_as_absent() {
        let mut s = stream("News 24", "http://x/2");
        s.tvg_group = Some(String::new());
        s.tvg_id = Some(String::new());

        let output = emit_playlist(&[s]);
        assert!(!output.contains("tvg-group"));
        assert!(!output.contains("group-title"));
        assert!(!output.contains("tvg-id="));
    }

    #[test]
    fn emission_is_idempotent() {
        let streams = vec![stream("A", "http://x/a"), stream("B", "http://x/b")];
        assert_eq!(emit_playlist(&streams), emit_playlist(&streams));
    }

    #[test]
    fn uri_lines_round_trip_input_order() {
        let streams = vec![
            stream("Zeta", "http://x/z"),
            stream("Alpha", "http://x/a"),
            stream("Mid", "http://x/m"),
        ];
        let output = emit_playlist(&streams);

        let uris: Vec<&str> = output
            .lines()
            .filter(|line| !line.starts_with('#'))
            .collect();
        assert_eq!(uris, vec!["http://x/z", "http://x/a", "http://x/m"]);
    }
}
