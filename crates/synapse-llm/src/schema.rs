//! Structured-output schemas, in the OpenAPI subset Gemini accepts for
//! `responseSchema` (upper-case type names, `required`, `nullable`).

use serde_json::{json, Value};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn number(description: &str) -> Value {
    json!({ "type": "NUMBER", "description": description })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

pub fn entity_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": string(),
            "type": {
                "type": "STRING",
                "description": "One of PERSON, ORGANIZATION, UNIT, LOCATION, REGION, FACILITY, \
                                OBJECT, ASSET, WEAPON, SYSTEM, EVENT, INCIDENT, DATE, TIME, \
                                CAPABILITY, TECH, CYBER, or MISC"
            },
            "role": { "type": "STRING", "nullable": true },
            "description": { "type": "STRING", "nullable": true },
            "confidence": number("0.0 to 1.0")
        },
        "required": ["name", "type", "confidence"]
    })
}

pub fn relation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "source": { "type": "STRING", "description": "Entity name, exactly as listed in entities" },
            "target": { "type": "STRING", "description": "Entity name, exactly as listed in entities" },
            "type": { "type": "STRING", "description": "Upper-case relation verb, e.g. COMMANDS, LOCATED_IN" },
            "confidence": number("0.0 to 1.0")
        },
        "required": ["source", "target", "type"]
    })
}

pub fn insight_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": { "type": "STRING", "description": "THREAT, INTENT, CAPABILITY, GAP or TREND" },
            "text": string(),
            "confidence": number("0.0 to 1.0")
        },
        "required": ["category", "text"]
    })
}

pub fn timeline_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "date": { "type": "STRING", "description": "Date as reported, ISO 8601 when known" },
            "event": string(),
            "entities": array_of(string())
        },
        "required": ["date", "event"]
    })
}

/// Full document analysis response.
pub fn document_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": string(),
            "summary": string(),
            "clean_text": { "type": "STRING", "description": "The document text with noise, ads and boilerplate removed" },
            "entities": array_of(entity_schema()),
            "relations": array_of(relation_schema()),
            "insights": array_of(insight_schema()),
            "timeline": array_of(timeline_schema()),
            "reliability": number("Source reliability, 0.0 (unverified) to 1.0 (confirmed)")
        },
        "required": ["title", "summary", "clean_text", "entities", "relations", "insights", "reliability"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_schema_shape() {
        let schema = document_analysis_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["entities"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["entities"]["items"]["properties"]["type"]["type"], "STRING");
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for key in required {
            assert!(schema["properties"].get(key).is_some(), "required key {key} missing");
        }
    }
}
