use serde_json::{Map, Value};

use crate::form_models::{
    FormResponseRecord, GroupTag, PersonalInfo, RequiredField, ANSWER_COLUMN_MAX_LEN,
};

/// Keeps at most `max_chars` characters of `value`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}

/// Text form of a single answer value.
pub fn answer_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Comma-joined answer values of one group, truncated to the column width.
///
/// A group that is absent or not shaped like `{"answers": [...]}` flattens to
/// an empty string; so does an answer without a `value`.
pub fn flatten_group(responses: &Map<String, Value>, group: GroupTag) -> String {
    let answers = responses
        .get(group.tag())
        .and_then(|g| g.get("answers"))
        .and_then(Value::as_array);

    let Some(answers) = answers else {
        return String::new();
    };

    let joined = answers
        .iter()
        .map(|answer| answer.get("value").map(answer_text).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");

    truncate_chars(&joined, ANSWER_COLUMN_MAX_LEN)
}

/// Builds the row to persist from validated personal info and the raw responses.
pub fn build_record(info: &PersonalInfo, responses: &Map<String, Value>) -> FormResponseRecord {
    let mut record = FormResponseRecord {
        full_name: truncate_chars(&info.name, RequiredField::Name.max_len()),
        gender: truncate_chars(&info.gender, RequiredField::Gender.max_len()),
        city: truncate_chars(&info.city, RequiredField::City.max_len()),
        email: truncate_chars(&info.email, RequiredField::Email.max_len()),
        phone: truncate_chars(&info.phone, RequiredField::Phone.max_len()),
        occupation: truncate_chars(&info.occupation, RequiredField::Occupation.max_len()),
        ..Default::default()
    };

    for group in GroupTag::ALL {
        *record.answers_mut(group) = flatten_group(responses, group);
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn responses(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_truncate_keeps_prefix() {
        let name = "x".repeat(150);
        let truncated = truncate_chars(&name, 100);
        assert_eq!(truncated.chars().count(), 100);
        assert!(name.starts_with(&truncated));
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("ãéîõü", 3), "ãéî");
        assert_eq!(truncate_chars("short", 20), "short");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_flatten_joins_values_in_order() {
        let r = responses(json!({
            "weekend": {"answers": [{"value": "A"}, {"value": "B"}]}
        }));
        assert_eq!(flatten_group(&r, GroupTag::Weekend), "A,B");
        assert_eq!(flatten_group(&r, GroupTag::Vibe), "");
    }

    #[test]
    fn test_flatten_stringifies_scalars() {
        let r = responses(json!({
            "platform": {"answers": [{"value": 4}, {"value": true}, {"value": 2.5}, {"value": null}]}
        }));
        assert_eq!(flatten_group(&r, GroupTag::Platform), "4,true,2.5,");
    }

    #[test]
    fn test_flatten_defaults_malformed_groups() {
        let r = responses(json!({
            "meeting": "not a group",
            "vibe": {"answers": "not a list"},
            "blockers": {"answers": [{"label": "no value"}, "bare", {"value": "x"}]}
        }));
        assert_eq!(flatten_group(&r, GroupTag::Meeting), "");
        assert_eq!(flatten_group(&r, GroupTag::Vibe), "");
        assert_eq!(flatten_group(&r, GroupTag::Blockers), ",,x");
    }

    #[test]
    fn test_flatten_truncates_to_column_width() {
        let answers: Vec<Value> = (0..100).map(|i| json!({"value": format!("opt{i}")})).collect();
        let r = responses(json!({"safe_fun": {"answers": answers}}));
        let flattened = flatten_group(&r, GroupTag::SafeFun);
        assert_eq!(flattened.chars().count(), ANSWER_COLUMN_MAX_LEN);
        assert!(flattened.starts_with("opt0,opt1,opt2"));
    }

    #[test]
    fn test_build_record_maps_every_group() {
        let info = PersonalInfo {
            name: "Ana".to_string(),
            gender: "F".to_string(),
            city: "Lisbon".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+351900000000".to_string(),
            occupation: "Engineer".to_string(),
        };
        let mut body = Map::new();
        for group in GroupTag::ALL {
            body.insert(
                group.tag().to_string(),
                json!({"answers": [{"value": group.tag()}]}),
            );
        }

        let record = build_record(&info, &body);
        assert_eq!(record.full_name, "Ana");
        assert_eq!(record.phone, "+351900000000");
        for group in GroupTag::ALL {
            assert_eq!(record.answers(group), group.tag());
        }
    }
}
