use anyhow::{anyhow, Result};

/// Keys recognised in free-form task input, matched by unique prefix.
const KNOWN_KEYS: &[&str] = &["description"];

#[derive(Debug, PartialEq, Default)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
}

/// Splits `Buy milk desc: two litres` into a title and a description.
///
/// A `key:` token switches the target field; following words append to it
/// until the next key. Tokens whose key is unknown stay part of the current
/// field verbatim, so titles like `Call Bob at 10:30` survive.
pub fn parse_task_input(words: &[String]) -> TaskInput {
    let mut title = Vec::new();
    let mut description: Option<Vec<&str>> = None;

    for word in words {
        if let Some((key, rest)) = word.split_once(':') {
            if let Ok("description") = expand_key(key, KNOWN_KEYS).as_deref() {
                let target = description.get_or_insert_with(Vec::new);
                if !rest.is_empty() {
                    target.push(rest);
                }
                continue;
            }
        }
        match description.as_mut() {
            Some(target) => target.push(word.as_str()),
            None => title.push(word.as_str()),
        }
    }

    TaskInput {
        title: title.join(" "),
        description: description
            .map(|parts| parts.join(" "))
            .filter(|d| !d.is_empty()),
    }
}

pub fn parse_task_line(line: &str) -> TaskInput {
    let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    parse_task_input(&words)
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    if key.is_empty() {
        return Err(anyhow!("Empty key"));
    }
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|c| c.starts_with(key))
        .copied()
        .collect();

    match matches.as_slice() {
        [only] => Ok(only.to_string()),
        [] => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}
