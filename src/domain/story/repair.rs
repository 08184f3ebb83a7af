use super::model::{DefaultedFields, NarrativeResult, RepairSource};
use crate::domain::voice::profile::{DEFAULT_AVERAGE_PITCH, DEFAULT_PITCH_STD_DEV};
use crate::domain::voice::{VoiceProfile, MFCC_LENGTH};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Title used whenever the response doesn't provide one
pub const PLACEHOLDER_TITLE: &str = "Auto-generated Story";

/// Body used when the response is empty
pub const EMPTY_BODY: &str = "No story content was generated.";

const LEGACY_DELIMITER: &str = "**";
const LEGACY_TITLE_PREFIXES: [&str; 2] = ["동화:", "story:"];

static TITLE_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field_pattern("title"));
static TEXT_FIELD: LazyLock<Regex> = LazyLock::new(|| string_field_pattern("text"));
static AVERAGE_PITCH_FIELD: LazyLock<Regex> =
    LazyLock::new(|| number_field_pattern("averagePitch"));
static PITCH_STD_DEV_FIELD: LazyLock<Regex> =
    LazyLock::new(|| number_field_pattern("pitchStdDev"));

fn string_field_pattern(name: &str) -> Regex {
    Regex::new(&format!(r#""{name}"\s*:\s*"((?:[^"\\]|\\.)*)""#))
        .expect("valid field pattern")
}

fn number_field_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r#""{name}"\s*:\s*"?(-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)"#
    ))
    .expect("valid field pattern")
}

/// Expected shape of the generated object
#[derive(Debug, Deserialize)]
struct StoryPayload {
    title: String,
    text: String,
    #[serde(rename = "averagePitch")]
    average_pitch: Option<f64>,
    #[serde(rename = "pitchStdDev")]
    pitch_std_dev: Option<f64>,
    #[serde(rename = "mfccValues")]
    mfcc_values: Option<Vec<Vec<f64>>>,
}

/// Fields recovered from an object, before defaults are applied
#[derive(Debug)]
struct ExtractedFields {
    title: String,
    text: String,
    average_pitch: Option<f64>,
    pitch_std_dev: Option<f64>,
    mfcc_values: Option<Vec<Vec<f64>>>,
}

impl From<StoryPayload> for ExtractedFields {
    fn from(payload: StoryPayload) -> Self {
        Self {
            title: payload.title,
            text: payload.text,
            average_pitch: payload.average_pitch,
            pitch_std_dev: payload.pitch_std_dev,
            mfcc_values: payload.mfcc_values,
        }
    }
}

/// Turn raw generation output into a usable story. Never fails.
///
/// Order of attempts:
/// 1. "**Story: title**" marker at the very start (legacy format)
/// 2. the span between the first `{` and the last `}`, decoded strictly,
///    then permissively (type coercion, then regex field extraction)
/// 3. the whole text as the body under a placeholder title
///
/// An object without a non-blank `title` and `text` counts as no object.
pub fn repair(raw: &str) -> NarrativeResult {
    if raw.trim().is_empty() {
        tracing::warn!("Generation response is empty, using placeholder story");
        return NarrativeResult {
            title: PLACEHOLDER_TITLE.to_string(),
            body: EMPTY_BODY.to_string(),
            raw_text: raw.to_string(),
            voice_profile: VoiceProfile::default(),
            source: RepairSource::Empty,
            defaulted: DefaultedFields::all_voice_fields(true, true),
        };
    }

    if let Some(result) = repair_legacy_delimited(raw) {
        tracing::debug!(title = %result.title, "Response used legacy title delimiter");
        return result;
    }

    if let Some(candidate) = object_candidate(raw) {
        match serde_json::from_str::<StoryPayload>(candidate) {
            Ok(payload) if has_required_fields(&payload.title, &payload.text) => {
                return with_defaults(payload.into(), raw, RepairSource::StrictObject);
            }
            Ok(_) => {
                tracing::warn!("Generated object is missing title or text");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Strict decode failed, trying permissive extraction");
                if let Some(fields) = extract_permissive(candidate) {
                    return with_defaults(fields, raw, RepairSource::PermissiveObject);
                }
                tracing::warn!("No usable object in generation response");
            }
        }
    }

    tracing::info!(
        text_length = raw.len(),
        "Using whole generation response as story body"
    );
    NarrativeResult {
        title: PLACEHOLDER_TITLE.to_string(),
        body: raw.to_string(),
        raw_text: raw.to_string(),
        voice_profile: VoiceProfile::default(),
        source: RepairSource::PlainText,
        defaulted: DefaultedFields::all_voice_fields(true, false),
    }
}

/// "**동화: title**\n\nbody" or "**Story: title** body"
fn repair_legacy_delimited(raw: &str) -> Option<NarrativeResult> {
    let text = raw.trim_start();
    let after_delimiter = text.strip_prefix(LEGACY_DELIMITER)?;
    let head = after_delimiter.trim_start().to_lowercase();
    if !LEGACY_TITLE_PREFIXES
        .iter()
        .any(|prefix| head.starts_with(prefix))
    {
        return None;
    }

    let segments: Vec<&str> = text.split(LEGACY_DELIMITER).collect();
    if segments.len() < 3 {
        return None;
    }

    let marked_title = segments[1].trim();
    let title = LEGACY_TITLE_PREFIXES
        .iter()
        .find_map(|prefix| strip_prefix_ignore_case(marked_title, prefix))
        .unwrap_or(marked_title)
        .trim();
    let body = segments[2..].join(" ").trim().to_string();

    let title_defaulted = title.is_empty();
    let body_defaulted = body.is_empty();

    Some(NarrativeResult {
        title: if title_defaulted {
            PLACEHOLDER_TITLE.to_string()
        } else {
            title.to_string()
        },
        body: if body_defaulted {
            EMPTY_BODY.to_string()
        } else {
            body
        },
        raw_text: raw.to_string(),
        voice_profile: VoiceProfile::default(),
        source: RepairSource::LegacyDelimiter,
        defaulted: DefaultedFields::all_voice_fields(title_defaulted, body_defaulted),
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.to_lowercase() == prefix {
        text.get(prefix.len()..)
    } else {
        None
    }
}

/// Span from the first `{` to the last `}`, inclusive
fn object_candidate(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn has_required_fields(title: &str, text: &str) -> bool {
    !title.trim().is_empty() && !text.trim().is_empty()
}

/// Second phase: coerce a loosely-typed object, or pull fields out with regexes
/// when the candidate isn't valid JSON at all
fn extract_permissive(candidate: &str) -> Option<ExtractedFields> {
    let fields = match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => coerce_object(&object),
        Ok(_) => None,
        Err(_) => extract_with_patterns(candidate),
    }?;

    has_required_fields(&fields.title, &fields.text).then_some(fields)
}

fn coerce_object(object: &Map<String, Value>) -> Option<ExtractedFields> {
    let title = object.get("title")?.as_str()?.to_string();
    let text = object.get("text")?.as_str()?.to_string();

    Some(ExtractedFields {
        title,
        text,
        average_pitch: object.get("averagePitch").and_then(coerce_number),
        pitch_std_dev: object.get("pitchStdDev").and_then(coerce_number),
        mfcc_values: object.get("mfccValues").and_then(coerce_coefficients),
    })
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// All rows must be arrays of JSON numbers, otherwise nothing is taken
fn coerce_coefficients(value: &Value) -> Option<Vec<Vec<f64>>> {
    value
        .as_array()?
        .iter()
        .map(|row| {
            row.as_array()?
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
        })
        .collect()
}

fn extract_with_patterns(candidate: &str) -> Option<ExtractedFields> {
    let title = capture_string(&TITLE_FIELD, candidate)?;
    let text = capture_string(&TEXT_FIELD, candidate)?;

    Some(ExtractedFields {
        title,
        text,
        average_pitch: capture_number(&AVERAGE_PITCH_FIELD, candidate),
        pitch_std_dev: capture_number(&PITCH_STD_DEV_FIELD, candidate),
        mfcc_values: None,
    })
}

fn capture_string(pattern: &Regex, haystack: &str) -> Option<String> {
    let escaped = pattern.captures(haystack)?.get(1)?.as_str();
    // decode JSON escapes; literal newlines inside the string make that fail
    Some(
        serde_json::from_str::<String>(&format!("\"{escaped}\"")).unwrap_or_else(|_| {
            escaped
                .replace("\\n", "\n")
                .replace("\\t", "\t")
                .replace("\\\"", "\"")
                .replace("\\\\", "\\")
        }),
    )
}

fn capture_number(pattern: &Regex, haystack: &str) -> Option<f64> {
    pattern.captures(haystack)?.get(1)?.as_str().parse().ok()
}

/// Rows must all be 13 finite numbers; anything else discards the whole set
fn valid_coefficients(rows: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let valid = !rows.is_empty()
        && rows
            .iter()
            .all(|row| row.len() == MFCC_LENGTH && row.iter().all(|v| v.is_finite()));
    valid.then_some(rows)
}

fn with_defaults(fields: ExtractedFields, raw: &str, source: RepairSource) -> NarrativeResult {
    let average_pitch = fields.average_pitch.filter(|v| v.is_finite());
    let pitch_std_dev = fields.pitch_std_dev.filter(|v| v.is_finite());
    let mfcc_values = fields.mfcc_values.and_then(valid_coefficients);

    let defaulted = DefaultedFields {
        title: false,
        body: false,
        average_pitch: average_pitch.is_none(),
        pitch_std_dev: pitch_std_dev.is_none(),
        mfcc_values: mfcc_values.is_none(),
    };

    if defaulted.mfcc_values {
        tracing::debug!("MFCC values missing or malformed, using zero vector");
    }

    NarrativeResult {
        title: fields.title,
        body: fields.text,
        raw_text: raw.to_string(),
        voice_profile: VoiceProfile::new(
            average_pitch.unwrap_or(DEFAULT_AVERAGE_PITCH),
            pitch_std_dev.unwrap_or(DEFAULT_PITCH_STD_DEV),
            mfcc_values.unwrap_or_else(|| vec![VoiceProfile::zero_vector()]),
        ),
        source,
        defaulted,
    }
}
