// srtext-core/src/document/json.rs
//! DICOM JSON model (PS3.18 Annex F) encoding for [`Dataset`].
//!
//! Keys may be eight-digit hex tags or keywords. An entry is normally an
//! object carrying `vr` and `Value`; a bare scalar or array is accepted too
//! and takes its VR from the tag dictionary, which is the flattened layout
//! some document stores use. Keyword keys the dictionary does not know are
//! skipped.
//!
//! Values keep the form they were read in: numeric VRs given as JSON strings
//! stay strings, and person names keep all three component groups, so a
//! document that is read and written again only changes where it was edited.

use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value as Json};
use std::path::Path;

use super::{Dataset, Element, PersonName, Value};
use crate::errors::{Result, SrTextError};
use crate::tags::{Tag, Vr};

/// Keys left behind by document-store exports; never attributes.
const STORE_ARTEFACT_KEYS: &[&str] = &["_id", "header", "ImageReference"];

const PN_GROUPS: [&str; 3] = ["Alphabetic", "Ideographic", "Phonetic"];

impl Dataset {
    pub fn from_json(json: &Json) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| SrTextError::InvalidDocument("dataset must be a JSON object".into()))?;
        let mut dataset = Dataset::new();
        for (key, entry) in object {
            if STORE_ARTEFACT_KEYS.contains(&key.as_str()) {
                debug!("Skipping document-store key '{}'", key);
                continue;
            }
            let tag: Tag = match key.parse() {
                Ok(tag) => tag,
                Err(SrTextError::UnknownKeyword(_)) => {
                    debug!("Skipping unknown attribute keyword '{}'", key);
                    continue;
                }
                Err(e) => return Err(e),
            };
            dataset.insert(element_from_json(tag, entry)?);
        }
        Ok(dataset)
    }

    pub fn to_json(&self) -> Json {
        let mut object = Map::new();
        for element in self.iter() {
            object.insert(element.tag.to_hex(), element_to_json(element));
        }
        Json::Object(object)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let json: Json = serde_json::from_str(text)?;
        Self::from_json(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Dataset::from_json(&json).map_err(D::Error::custom)
    }
}

fn element_from_json(tag: Tag, entry: &Json) -> Result<Element> {
    let dictionary_vr = tag.keyword().map(|k| k.vr());
    let (vr, body) = match entry {
        Json::Object(object) if object.contains_key("vr") || object.is_empty() => {
            let vr = match object.get("vr").and_then(Json::as_str) {
                Some(code) => Vr::parse(code).ok_or_else(|| {
                    SrTextError::InvalidDocument(format!("{}: unknown VR '{}'", tag, code))
                })?,
                None => dictionary_vr.unwrap_or(Vr::UN),
            };
            (vr, Body::Object(object))
        }
        other => {
            let vr = dictionary_vr.ok_or_else(|| {
                SrTextError::InvalidDocument(format!("{}: bare value needs a known tag", tag))
            })?;
            (vr, Body::Bare(other))
        }
    };

    let value = match body {
        Body::Object(object) => {
            if let Some(Json::String(b64)) = object.get("InlineBinary") {
                Value::InlineBinary(b64.clone())
            } else if let Some(Json::String(uri)) = object.get("BulkDataURI") {
                Value::BulkDataUri(uri.clone())
            } else {
                match object.get("Value") {
                    None | Some(Json::Null) => Value::Empty,
                    Some(values) => parse_values(tag, vr, values)?,
                }
            }
        }
        Body::Bare(Json::Null) => Value::Empty,
        Body::Bare(values) => parse_values(tag, vr, values)?,
    };
    Ok(Element { tag, vr, value })
}

enum Body<'a> {
    Object(&'a Map<String, Json>),
    Bare(&'a Json),
}

fn parse_values(tag: Tag, vr: Vr, values: &Json) -> Result<Value> {
    let list: Vec<&Json> = match values {
        Json::Array(items) => items.iter().collect(),
        single => vec![single],
    };
    if list.is_empty() {
        return Ok(Value::Empty);
    }
    match vr {
        Vr::SQ => {
            let items = list
                .into_iter()
                .map(Dataset::from_json)
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Items(items))
        }
        Vr::PN => Ok(Value::Names(
            list.into_iter().map(person_name_from_json).collect(),
        )),
        vr if vr.is_json_number() => {
            let numbers: Option<Vec<serde_json::Number>> = list
                .iter()
                .map(|v| match v {
                    Json::Number(n) => Some(n.clone()),
                    _ => None,
                })
                .collect();
            Ok(match numbers {
                Some(n) => Value::Numbers(n),
                None => Value::Strings(list.into_iter().map(scalar_to_string).collect()),
            })
        }
        _ => {
            if list.iter().any(|v| v.is_object() || v.is_array()) {
                return Err(SrTextError::InvalidDocument(format!(
                    "{}: nested value in a {} element",
                    tag, vr
                )));
            }
            Ok(Value::Strings(list.into_iter().map(scalar_to_string).collect()))
        }
    }
}

fn person_name_from_json(value: &Json) -> PersonName {
    match value {
        Json::Object(groups) => {
            let group = |name: &str| groups.get(name).and_then(Json::as_str).map(str::to_string);
            PersonName {
                alphabetic: group(PN_GROUPS[0]).unwrap_or_default(),
                ideographic: group(PN_GROUPS[1]),
                phonetic: group(PN_GROUPS[2]),
            }
        }
        other => PersonName::new(scalar_to_string(other)),
    }
}

fn person_name_to_json(name: &PersonName) -> Json {
    let mut groups = Map::new();
    let present = [
        Some(&name.alphabetic).filter(|a| !a.is_empty()),
        name.ideographic.as_ref(),
        name.phonetic.as_ref(),
    ];
    for (group, value) in PN_GROUPS.iter().zip(present) {
        if let Some(value) = value {
            groups.insert(group.to_string(), Json::String(value.clone()));
        }
    }
    Json::Object(groups)
}

fn scalar_to_string(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn element_to_json(element: &Element) -> Json {
    let vr = element.vr.as_str();
    match &element.value {
        Value::Empty => json!({ "vr": vr }),
        Value::Strings(v) => json!({ "vr": vr, "Value": v }),
        Value::Names(v) => {
            let names: Vec<Json> = v.iter().map(person_name_to_json).collect();
            json!({ "vr": vr, "Value": names })
        }
        Value::Numbers(v) => json!({ "vr": vr, "Value": v }),
        Value::Items(items) => {
            let items: Vec<Json> = items.iter().map(Dataset::to_json).collect();
            json!({ "vr": vr, "Value": items })
        }
        Value::InlineBinary(b64) => json!({ "vr": vr, "InlineBinary": b64 }),
        Value::BulkDataUri(uri) => json!({ "vr": vr, "BulkDataURI": uri }),
    }
}
