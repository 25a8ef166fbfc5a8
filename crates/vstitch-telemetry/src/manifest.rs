//! DASH manifest handling for VOD downloads.
//!
//! Only the `SegmentTemplate` attributes are needed: segments are fetched
//! by rewriting the manifest URI, never by walking the full MPD.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{TelemetryError, TelemetryResult};

/// Seconds of footage per media segment.
pub const SEGMENT_SECONDS: i64 = 2;

const NUMBER_PLACEHOLDER: &str = "$Number$";

/// Segment naming parsed from a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTemplate {
    /// Media segment name pattern containing `$Number$`
    pub media: String,
    /// Init segment name
    pub initialization: String,
    pub start_number: u64,
}

/// Opening tag of the first `SegmentTemplate` element.
static TEMPLATE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<SegmentTemplate\b([^>]*)>").unwrap());

/// `name="value"` pairs inside a tag.
static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*"([^"]*)""#).unwrap());

fn attribute(tag: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(tag)
        .find(|c| &c[1] == name)
        .map(|c| c[2].to_string())
}

/// Parse the first `SegmentTemplate` element of an MPD document.
pub fn parse_segment_template(mpd: &str) -> TelemetryResult<SegmentTemplate> {
    let tag = TEMPLATE_TAG
        .captures(mpd)
        .map(|c| c[1].to_string())
        .ok_or_else(|| TelemetryError::invalid_manifest("no SegmentTemplate element"))?;

    let media = attribute(&tag, "media")
        .ok_or_else(|| TelemetryError::invalid_manifest("SegmentTemplate has no media attribute"))?;
    if !media.contains(NUMBER_PLACEHOLDER) {
        return Err(TelemetryError::invalid_manifest(format!(
            "media pattern {} has no {}",
            media, NUMBER_PLACEHOLDER
        )));
    }

    let initialization = attribute(&tag, "initialization").ok_or_else(|| {
        TelemetryError::invalid_manifest("SegmentTemplate has no initialization attribute")
    })?;

    let start_number = match attribute(&tag, "startNumber") {
        Some(raw) => raw.trim().parse().map_err(|_| {
            TelemetryError::invalid_manifest(format!("bad startNumber: {}", raw))
        })?,
        None => 0,
    };

    Ok(SegmentTemplate {
        media,
        initialization,
        start_number,
    })
}

/// Fill the time placeholders of a VOD URI template.
///
/// `duration_sec` is inclusive of both ends: `end - start + 1`.
pub fn expand_uri_template(template: &str, start_sec: i64, duration_sec: i64) -> String {
    template
        .replace("{START_TIME}", &start_sec.to_string())
        .replace("{DURATION}", &duration_sec.to_string())
}

/// Number of media segments covering `duration_sec`.
pub fn segment_count(duration_sec: i64) -> u64 {
    if duration_sec <= 0 {
        return 0;
    }
    ((duration_sec + SEGMENT_SECONDS - 1) / SEGMENT_SECONDS) as u64
}

impl SegmentTemplate {
    /// URI of the init segment next to the manifest.
    pub fn init_uri(&self, manifest_uri: &str, manifest_name: &str) -> String {
        manifest_uri.replacen(manifest_name, &self.initialization, 1)
    }

    /// URI of the `index`-th media segment, counting from zero.
    pub fn segment_uri(&self, manifest_uri: &str, manifest_name: &str, index: u64) -> String {
        let name = self
            .media
            .replace(NUMBER_PLACEHOLDER, &(index + self.start_number).to_string());
        manifest_uri.replacen(manifest_name, &name, 1)
    }
}
