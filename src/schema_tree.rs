//! Typed view of a resolved DTR schema record.
//!
//! `dtr fetch-schema --resolve-subtypes` produces a record in which every
//! member `Type` and array `subCond` has been replaced by the referenced
//! record. This module walks that document and yields one [`DtrElement`] per
//! member, so that element paths can be paired with type PIDs.

use crate::constants::MAX_RESOLVE_DEPTH;
use crate::error::TacosError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Repeats a single child element
    Array,
    /// Holds named members
    Object,
    /// Leaf type with no further structure
    BasicInfoType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtrElement {
    pub pid: String,
    pub name: String,
    pub kind: ElementKind,
    pub children: Vec<DtrElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtrSchema {
    pub pid: Option<String>,
    pub name: Option<String>,
    pub elements: Vec<DtrElement>,
}

impl DtrSchema {
    /// Build the tree from a resolved schema record.
    pub fn from_resolved(record: &Value) -> Result<Self, TacosError> {
        let schema = record.pointer("/content/Schema").ok_or_else(|| {
            TacosError::Conversion("schema record has no content.Schema".to_string())
        })?;
        Ok(DtrSchema {
            pid: record.get("pid").and_then(Value::as_str).map(str::to_string),
            name: record.get("name").and_then(Value::as_str).map(str::to_string),
            elements: children_of(schema, 1)?,
        })
    }

    /// `(path, pid)` for every element, parents before children.
    ///
    /// Paths join member names with `/`, starting below the schema root.
    pub fn element_paths(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for element in &self.elements {
            collect_paths(element, "", &mut out);
        }
        out
    }
}

fn collect_paths(element: &DtrElement, prefix: &str, out: &mut Vec<(String, String)>) {
    let path = if prefix.is_empty() {
        element.name.clone()
    } else {
        format!("{prefix}/{}", element.name)
    };
    out.push((path.clone(), element.pid.clone()));
    for child in &element.children {
        collect_paths(child, &path, out);
    }
}

fn children_of(schema: &Value, depth: usize) -> Result<Vec<DtrElement>, TacosError> {
    if depth > MAX_RESOLVE_DEPTH {
        return Err(TacosError::Conversion(format!(
            "type nesting deeper than {MAX_RESOLVE_DEPTH} levels"
        )));
    }
    match schema.get("Type").and_then(Value::as_str) {
        Some("Array") => {
            let sub = schema.get("subCond").ok_or_else(|| {
                TacosError::Conversion("array type without subCond".to_string())
            })?;
            Ok(vec![parse_sub_condition(sub, depth)?])
        }
        _ => match schema.get("Properties") {
            None => Ok(Vec::new()),
            Some(Value::Array(members)) => members
                .iter()
                .map(|m| parse_member(m, depth))
                .collect(),
            Some(_) => Err(TacosError::Conversion(
                "Schema.Properties is not a list".to_string(),
            )),
        },
    }
}

/// A `Properties` entry: `{"Name": ..., "Type": <pid or resolved record>}`.
fn parse_member(member: &Value, depth: usize) -> Result<DtrElement, TacosError> {
    let name = member.get("Name").and_then(Value::as_str);
    match member.get("Type") {
        Some(Value::String(pid)) => Ok(DtrElement {
            pid: pid.clone(),
            name: name.unwrap_or(pid).to_string(),
            kind: ElementKind::BasicInfoType,
            children: Vec::new(),
        }),
        Some(record @ Value::Object(_)) => parse_record(record, name, depth),
        _ => Err(TacosError::Conversion(format!(
            "member {} has no usable Type",
            name.unwrap_or("<unnamed>")
        ))),
    }
}

/// An array's `subCond`: a bare pid when unresolved, a record otherwise.
fn parse_sub_condition(sub: &Value, depth: usize) -> Result<DtrElement, TacosError> {
    match sub {
        Value::String(pid) => Ok(DtrElement {
            pid: pid.clone(),
            name: pid.clone(),
            kind: ElementKind::BasicInfoType,
            children: Vec::new(),
        }),
        Value::Object(_) => parse_record(sub, None, depth),
        _ => Err(TacosError::Conversion(
            "subCond is neither a pid nor a type record".to_string(),
        )),
    }
}

fn parse_record(
    record: &Value,
    member_name: Option<&str>,
    depth: usize,
) -> Result<DtrElement, TacosError> {
    let pid = record
        .get("pid")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            TacosError::Conversion(format!(
                "type record for {} has no pid",
                member_name.unwrap_or("<unnamed>")
            ))
        })?
        .to_string();
    let name = member_name
        .or_else(|| record.get("name").and_then(Value::as_str))
        .unwrap_or(&pid)
        .to_string();

    let Some(schema) = record.pointer("/content/Schema") else {
        return Ok(DtrElement {
            pid,
            name,
            kind: ElementKind::BasicInfoType,
            children: Vec::new(),
        });
    };
    let kind = match schema.get("Type").and_then(Value::as_str) {
        Some("Array") => ElementKind::Array,
        Some("Object") => ElementKind::Object,
        _ => ElementKind::BasicInfoType,
    };
    let children = match kind {
        ElementKind::BasicInfoType => Vec::new(),
        _ => children_of(schema, depth + 1)?,
    };
    Ok(DtrElement {
        pid,
        name,
        kind,
        children,
    })
}
