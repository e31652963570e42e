use crate::error::{BuildError, Location};
use crate::model::NodePayload;
use crate::source::{
    ElementKind, RawExit, RawFlexible, RawNodeCommon, RawOpenQuestion, RawTemplate, parse_payload,
};
use serde_json::Value;

/// A fully parsed element payload, ready to be written into a skeleton node.
pub(super) struct ParsedNode {
    pub common: RawNodeCommon,
    pub payload: NodePayload,
}

/// Parses the payload of an element according to its kind.
pub(super) fn parse_node(
    kind: ElementKind,
    value: &Value,
    uuid: &str,
    location: &Location,
) -> Result<ParsedNode, BuildError> {
    let key = kind.key();
    let common: RawNodeCommon = parse_payload(value, uuid, key, location)?;

    let payload = match kind {
        ElementKind::Standard => NodePayload::Standard,
        ElementKind::Flexible => {
            let raw: RawFlexible = parse_payload(value, uuid, key, location)?;
            NodePayload::Flexible {
                subtype: require(raw.subtype, "subtype", location)?,
                data: raw.subtype_data,
            }
        }
        ElementKind::OpenQuestion => {
            let raw: RawOpenQuestion = parse_payload(value, uuid, key, location)?;
            NodePayload::OpenQuestion {
                question: raw.question,
                variable: raw.variable,
            }
        }
        ElementKind::Exit => {
            let raw: RawExit = parse_payload(value, uuid, key, location)?;
            NodePayload::Exit {
                exit: raw.exit_type,
            }
        }
        ElementKind::Template => {
            let raw: RawTemplate = parse_payload(value, uuid, key, location)?;
            NodePayload::Template {
                template_uuid: require(raw.template_uuid, "templateUuid", location)?,
                parameters: raw.parameters,
            }
        }
    };

    Ok(ParsedNode { common, payload })
}

fn require(value: Option<String>, field: &str, location: &Location) -> Result<String, BuildError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| BuildError::MissingRequiredField {
            field: field.to_string(),
            location: location.clone().with_field(field),
        })
}
