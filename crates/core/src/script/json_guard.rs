//! Harden JSON extracted from LLM responses.
//!
//! Models wrap JSON in code fences, prepend prose, leave trailing commas,
//! and emit stray control characters. These helpers cut out the outermost
//! JSON value and repair the common damage before parsing.

use anyhow::{bail, Context, Result};

/// Strip code fences and control characters.
fn clean(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect()
}

/// Remove trailing commas before closing brackets, outside strings.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                // Drop a comma left dangling before this bracket
                while out
                    .chars()
                    .last()
                    .map(|p| p.is_whitespace() || p == ',')
                    .unwrap_or(false)
                {
                    if out.ends_with(',') {
                        out.pop();
                        break;
                    }
                    out.pop();
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Slice from the first occurrence of `open` to the last of `close`.
fn outermost(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract the outermost JSON object from an LLM response.
pub fn extract_object(text: &str) -> Result<serde_json::Value> {
    let cleaned = clean(text);
    let Some(slice) = outermost(&cleaned, '{', '}') else {
        bail!("no JSON object found in response");
    };
    let repaired = strip_trailing_commas(slice);
    serde_json::from_str(&repaired).context("failed to parse JSON object from response")
}

/// Extract the outermost JSON array from an LLM response.
pub fn extract_array(text: &str) -> Result<serde_json::Value> {
    let cleaned = clean(text);
    let Some(slice) = outermost(&cleaned, '[', ']') else {
        bail!("no JSON array found in response");
    };
    let repaired = strip_trailing_commas(slice);
    serde_json::from_str(&repaired).context("failed to parse JSON array from response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_object() {
        let v = extract_object(r#"{"script": "xin chào"}"#).unwrap();
        assert_eq!(v["script"], "xin chào");
    }

    #[test]
    fn test_extract_object_with_prose_and_fences() {
        let text = "Sure! Here is the script:\n```json\n{\"script\": \"nội dung\"}\n```";
        let v = extract_object(text).unwrap();
        assert_eq!(v["script"], "nội dung");
    }

    #[test]
    fn test_extract_object_repairs_trailing_comma() {
        let v = extract_object("{\"a\": 1, \"b\": [1, 2,], }").unwrap();
        assert_eq!(v["b"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_extract_object_strips_control_chars() {
        let v = extract_object("{\"a\": \"x\u{0007}y\"}").unwrap();
        assert_eq!(v["a"], "xy");
    }

    #[test]
    fn test_commas_inside_strings_survive() {
        let v = extract_object(r#"{"a": "one, two, }"}"#).unwrap();
        assert_eq!(v["a"], "one, two, }");
    }

    #[test]
    fn test_extract_array() {
        let text = "```json\n[{\"start\": 0, \"end\": 2.5, \"keywords\": [\"cat\"]}]\n```";
        let v = extract_array(text).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_no_json_is_an_error() {
        assert!(extract_object("no braces here").is_err());
        assert!(extract_array("still nothing").is_err());
    }
}
