// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Parse flat typeName[index]@subfield assignments and reshape them into nested metadata fields
// role: metadata field reshaping
// inputs: flat key=value pairs from -v options or CSV row cells; replace flag
// outputs: Vec<Field> ready for the {"fields": [...]} update envelope
// side_effects: none (pure transformation)
// invariants:
// - bare scalar keys require replace; repeated forms are accepted either way
// - compound fields are always repeatable; a scalar un-indexed subfield is rejected
// - bracket-free JSON-list and explicit-index conventions never mix for one field name
// - output preserves first-seen field-name order
// errors: FieldError::{Validation, MalformedList, InputShape}; all raised before any network call
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Reserved column name under which tabular parsing stashes any cell beyond
/// the header width. Its presence means the row was misquoted or has stray
/// separators, so reshaping refuses the whole row.
pub const REST_COLUMN: &str = "__rest__";

#[derive(Debug, Error)]
pub enum FieldError {
  #[error("field `{key}`: {reason}")]
  Validation { key: String, reason: String },

  #[error("field `{key}`: value starts with `[` but is not a valid JSON list")]
  MalformedList {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("row has {count} value(s) beyond the declared columns; check separators and quoting")]
  InputShape { count: usize },
}

fn invalid(key: &str, reason: impl Into<String>) -> FieldError {
  FieldError::Validation { key: key.to_string(), reason: reason.into() }
}

/// One parsed occurrence of the flat assignment syntax:
/// `name`, `name[2]`, `name@sub`, or `name[2]@sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatKey {
  pub name: String,
  pub index: Option<usize>,
  pub subfield: Option<String>,
}

impl FlatKey {
  pub fn parse(raw: &str) -> Result<FlatKey, FieldError> {
    static KEY_RE: Lazy<regex::Regex> = Lazy::new(|| {
      regex::Regex::new(r"^([A-Za-z][A-Za-z-]*)(?:\[([0-9]+)\])?(?:@([A-Za-z][A-Za-z-]*))?$").unwrap()
    });

    let caps = KEY_RE
      .captures(raw)
      .ok_or_else(|| invalid(raw, "does not match `name`, `name[index]` or `name[index]@subfield`"))?;

    let index = match caps.get(2) {
      Some(m) => Some(
        m.as_str()
          .parse::<usize>()
          .map_err(|_| invalid(raw, "index is out of range"))?,
      ),
      None => None,
    };

    Ok(FlatKey {
      name: caps[1].to_string(),
      index,
      subfield: caps.get(3).map(|m| m.as_str().to_string()),
    })
  }
}

/// A reshaped metadata field in the wire shape the update endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
  #[serde(rename = "typeName")]
  pub type_name: String,
  pub value: Value,
}

impl Field {
  fn simple(name: &str, value: &str) -> Field {
    Field { type_name: name.to_string(), value: Value::String(value.to_string()) }
  }

  fn repeated(name: &str, values: Vec<Value>) -> Field {
    Field { type_name: name.to_string(), value: Value::Array(values) }
  }
}

// Occurrences of one field name, keeping bare/simple and subfield uses apart
// so cross-shape conflicts can be named precisely.
#[derive(Default)]
struct Occurrences<'a> {
  simple: Vec<(Option<usize>, &'a str)>,
  compound: Vec<(Option<usize>, String, &'a str)>,
}

/// Turns flat `key=value` pairs into nested metadata fields.
///
/// Simple fields come out as `{typeName, value}` (scalar or list), compound
/// fields as a repeatable list of per-index subfield maps. `replace` gates
/// bare scalar keys only; every repeated form is accepted either way.
pub fn reshape(flat: &[(String, String)], replace: bool) -> Result<Vec<Field>, FieldError> {
  // Guard 1: overflow marker from tabular parsing means the row shape is off.
  let overflow = flat.iter().filter(|(k, _)| k == REST_COLUMN).count();
  if overflow > 0 {
    return Err(FieldError::InputShape { count: overflow });
  }

  // Guard 2: parse every key up front so nothing is emitted for a half-valid row.
  let mut order: Vec<String> = Vec::new();
  let mut groups: HashMap<String, Occurrences> = HashMap::new();

  for (raw, value) in flat {
    let key = FlatKey::parse(raw)?;
    let group = groups.entry(key.name.clone()).or_insert_with(|| {
      order.push(key.name.clone());
      Occurrences::default()
    });
    match key.subfield {
      Some(sub) => group.compound.push((key.index, sub, value.as_str())),
      None => group.simple.push((key.index, value.as_str())),
    }
  }

  let mut fields = Vec::with_capacity(order.len());
  for name in &order {
    let group = &groups[name];
    if !group.simple.is_empty() && !group.compound.is_empty() {
      return Err(invalid(name, "used both as a plain field and as a compound parent"));
    }
    if group.compound.is_empty() {
      fields.push(reshape_simple(name, &group.simple, replace)?);
    } else {
      fields.push(reshape_compound(name, &group.compound)?);
    }
  }

  Ok(fields)
}

fn reshape_simple(
  name: &str,
  occurrences: &[(Option<usize>, &str)],
  replace: bool,
) -> Result<Field, FieldError> {
  let indexed: Vec<(usize, &str)> =
    occurrences.iter().filter_map(|(i, v)| i.map(|i| (i, *v))).collect();
  let bare: Vec<&str> = occurrences.iter().filter(|(i, _)| i.is_none()).map(|(_, v)| *v).collect();

  if !indexed.is_empty() {
    // Explicit-index convention. A bare occurrence next to it is ambiguous,
    // whether scalar or JSON list, so refuse instead of guessing a merge.
    if !bare.is_empty() {
      return Err(invalid(name, "mixes indexed occurrences with a bare assignment"));
    }
    let mut slots: Vec<Value> = vec![Value::Null; indexed.iter().map(|(i, _)| i + 1).max().unwrap_or(0)];
    for (i, v) in indexed {
      if !slots[i].is_null() {
        return Err(invalid(name, format!("index {i} assigned more than once")));
      }
      slots[i] = Value::String(v.to_string());
    }
    return Ok(Field::repeated(name, slots));
  }

  if bare.len() > 1 {
    return Err(invalid(name, "assigned more than once"));
  }
  let value = bare[0];

  if value.starts_with('[') {
    let values = parse_list_literal(name, value)?;
    return Ok(Field::repeated(name, values));
  }

  if !replace {
    return Err(invalid(
      name,
      "single-value fields can only be updated with replace semantics (pass --replace)",
    ));
  }
  Ok(Field::simple(name, value))
}

fn reshape_compound(
  name: &str,
  occurrences: &[(Option<usize>, String, &str)],
) -> Result<Field, FieldError> {
  let has_indexed = occurrences.iter().any(|(i, _, _)| i.is_some());
  let has_bare = occurrences.iter().any(|(i, _, _)| i.is_none());
  if has_indexed && has_bare {
    return Err(invalid(name, "mixes indexed subfields with bracket-free list subfields"));
  }

  // subfield name -> scalar value per occurrence index
  let mut columns: Vec<(String, HashMap<usize, Value>)> = Vec::new();
  let mut max_index = 0usize;

  if has_bare {
    // Bracket-free convention: every subfield value must be a JSON list; the
    // element position inside the list is the occurrence index.
    for (_, sub, value) in occurrences {
      let key = format!("{name}@{sub}");
      if columns.iter().any(|(s, _)| s == sub) {
        return Err(invalid(&key, "assigned more than once"));
      }
      if !value.starts_with('[') {
        return Err(invalid(
          &key,
          "single-value compound fields are not supported; pass a JSON list or use `name[index]@subfield`",
        ));
      }
      let values = parse_list_literal(&key, value)?;
      let mut cells = HashMap::new();
      for (i, element) in values.into_iter().enumerate() {
        max_index = max_index.max(i);
        cells.insert(i, element);
      }
      columns.push((sub.clone(), cells));
    }
  } else {
    for (index, sub, value) in occurrences {
      let i = index.unwrap_or(0);
      max_index = max_index.max(i);
      let key = format!("{name}[{i}]@{sub}");
      let cells = match columns.iter_mut().find(|(s, _)| s == sub) {
        Some((_, cells)) => cells,
        None => {
          columns.push((sub.clone(), HashMap::new()));
          &mut columns.last_mut().unwrap().1
        }
      };
      if cells.insert(i, Value::String(value.to_string())).is_some() {
        return Err(invalid(&key, "assigned more than once"));
      }
    }
  }

  // Zip subfield columns into one map per occurrence index; a column with no
  // cell at some index is simply omitted from that position's map.
  let mut positions: Vec<Value> = Vec::with_capacity(max_index + 1);
  for i in 0..=max_index {
    let mut position = Map::new();
    for (sub, cells) in &columns {
      if let Some(element) = cells.get(&i) {
        let mut wire = Map::new();
        wire.insert("typeName".to_string(), Value::String(sub.clone()));
        wire.insert("value".to_string(), element.clone());
        position.insert(sub.clone(), Value::Object(wire));
      }
    }
    positions.push(Value::Object(position));
  }

  Ok(Field::repeated(name, positions))
}

fn parse_list_literal(key: &str, value: &str) -> Result<Vec<Value>, FieldError> {
  let parsed: Value = serde_json::from_str(value)
    .map_err(|source| FieldError::MalformedList { key: key.to_string(), source })?;
  match parsed {
    Value::Array(values) => Ok(values),
    _ => Err(invalid(key, "expected a JSON list value")),
  }
}
