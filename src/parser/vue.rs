use std::sync::OnceLock;

use regex::Regex;

/// A script block extracted from a Vue component file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedScript {
    /// The script source, exactly as it appears between the tags.
    pub source: String,
    /// Number of lines in the component file before the script body starts.
    /// Added to tree positions so provenance ranges point into the `.vue`
    /// file rather than the extracted block.
    pub line_offset: usize,
    /// True when the block declares `lang="ts"`.
    pub typescript: bool,
}

/// Cheap pre-check for the presence of any script block.
pub fn has_embedded_script(text: &str) -> bool {
    text.contains("<script")
}

/// Extract the embedded script source from a component file.
///
/// Two strategies are tried in order: the structured `<script ...>` block
/// form, then the plain-text-delimited `<script setup>` form. Returns `None`
/// when neither matches — the file has no embedded script.
pub fn extract_embedded_script(text: &str) -> Option<EmbeddedScript> {
    structured_script_block(text).or_else(|| setup_script_block(text))
}

/// Strategy 1: a single `<script ...attrs...>body</script>` block, attributes
/// inspected for `lang="ts"`.
fn structured_script_block(text: &str) -> Option<EmbeddedScript> {
    static SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
    let re = SCRIPT_RE
        .get_or_init(|| Regex::new(r"(?s)<script([^>]*)>(.*?)</script>").expect("script-block regex"));

    let caps = re.captures(text)?;
    let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let body = caps.get(2)?;

    let typescript = attrs.contains("lang=\"ts\"") || attrs.contains("lang='ts'");
    let line_offset = text[..body.start()].matches('\n').count();

    Some(EmbeddedScript {
        source: body.as_str().to_owned(),
        line_offset,
        typescript,
    })
}

/// Strategy 2: plain string delimiters `<script setup>` ... `</script>`.
fn setup_script_block(text: &str) -> Option<EmbeddedScript> {
    const OPEN: &str = "<script setup>";
    const CLOSE: &str = "</script>";

    let start = text.find(OPEN)?;
    let body_start = start + OPEN.len();
    let body_end = text[body_start..].find(CLOSE)? + body_start;

    let line_offset = text[..body_start].matches('\n').count();

    Some(EmbeddedScript {
        source: text[body_start..body_end].to_owned(),
        line_offset,
        typescript: false,
    })
}
