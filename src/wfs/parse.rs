use super::attributes::AttributeSet;
use super::result::{Failure, NotFoundReason, SourceResult};
use super::source::{Format, Source};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

const MEMBER_ELEMENTS: &[&str] = &["featureMember", "featureMembers", "member"];

/// Turns a GetFeature response body into the outcome of a lookup.
pub fn feature_result(source: &Source, body: &str) -> SourceResult {
    let first = match source.format {
        Format::Json => match first_json_feature(source, body) {
            Err(_) if looks_like_xml(body) => first_gml_feature(source, body),
            res => res,
        },
        Format::Gml => first_gml_feature(source, body),
    };
    match first {
        Ok(None) => SourceResult::NotFound(NotFoundReason::EmptyResultSet),
        Ok(Some(attributes)) if attributes.is_empty() => {
            SourceResult::NotFound(NotFoundReason::NoAttributes)
        }
        Ok(Some(attributes)) => SourceResult::Found {
            source_id: source.id.clone(),
            attributes,
        },
        Err(failure) => SourceResult::Failed(failure),
    }
}

fn looks_like_xml(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// `Ok(None)` when the collection is empty.
pub fn first_json_feature(source: &Source, body: &str) -> Result<Option<AttributeSet>, Failure> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| Failure::parse(e.to_string(), body))?;
    let Some(features) = json.get("features") else {
        return Err(Failure::parse("Response has no features array", body));
    };
    let Some(features) = features.as_array() else {
        return Err(Failure::parse("Field features is not an array", body));
    };
    let Some(feature) = features.first() else {
        return Ok(None);
    };
    let mut attributes = AttributeSet::new();
    if let Some(properties) = feature.get("properties").and_then(Value::as_object) {
        for (k, v) in properties {
            if source.is_geometry_field(k) {
                continue;
            }
            attributes.insert(k.as_str(), json_text(v));
        }
    }
    Ok(Some(attributes))
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(it) => it.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

struct Field {
    name: String,
    skip: bool,
    text: String,
}

/// Walks a WFS FeatureCollection and collects the direct children of its first feature.
/// Nested elements contribute their text to the enclosing field.
pub fn first_gml_feature(source: &Source, body: &str) -> Result<Option<AttributeSet>, Failure> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut root_seen = false;
    let mut exception: Option<String> = None;
    let mut member_depth: Option<usize> = None;
    let mut feature_depth: Option<usize> = None;
    let mut attributes = AttributeSet::new();
    let mut field: Option<Field> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Failure::parse(e.to_string(), body))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !root_seen {
                    root_seen = true;
                    if is_exception_root(&name) {
                        exception = Some(String::new());
                    } else if name != "FeatureCollection" {
                        return Err(Failure::parse(
                            format!("Unexpected root element: {name}"),
                            body,
                        ));
                    }
                    continue;
                }
                if exception.is_some() {
                    continue;
                }
                match feature_depth {
                    None => {
                        if member_depth == Some(depth - 1) {
                            feature_depth = Some(depth);
                        } else if member_depth.is_none() && MEMBER_ELEMENTS.contains(&name.as_str())
                        {
                            member_depth = Some(depth);
                        }
                    }
                    Some(feature) if feature + 1 == depth => {
                        field = Some(Field {
                            skip: source.is_geometry_field(&name),
                            name,
                            text: String::new(),
                        });
                    }
                    Some(_) => {}
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !root_seen {
                    return self_closing_root(&name, body);
                }
                if feature_depth == Some(depth) && !source.is_geometry_field(&name) {
                    attributes.insert(name, "");
                } else if feature_depth.is_none() && member_depth == Some(depth) {
                    // a feature without a single child element
                    return Ok(Some(attributes));
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| Failure::parse(e.to_string(), body))?;
                collect_text(&mut exception, &mut field, &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                collect_text(&mut exception, &mut field, &text);
            }
            Event::End(_) => {
                if let Some(feature) = feature_depth {
                    if depth == feature + 1 {
                        if let Some(done) = field.take() {
                            if !done.skip {
                                attributes.insert(done.name, done.text);
                            }
                        }
                    } else if depth == feature {
                        return Ok(Some(attributes));
                    }
                }
                if member_depth == Some(depth) {
                    member_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(exception) = exception {
        return Err(Failure::ServiceException(exception));
    }
    if !root_seen {
        return Err(Failure::parse("Response is not an XML document", body));
    }
    Ok(None)
}

/// A self-closing root is either an empty collection or an empty exception report.
fn self_closing_root(name: &str, body: &str) -> Result<Option<AttributeSet>, Failure> {
    if name == "FeatureCollection" {
        Ok(None)
    } else if is_exception_root(name) {
        Err(Failure::ServiceException(String::new()))
    } else {
        Err(Failure::parse(
            format!("Unexpected root element: {name}"),
            body,
        ))
    }
}

fn is_exception_root(name: &str) -> bool {
    name == "ExceptionReport" || name == "ServiceExceptionReport"
}

fn collect_text(exception: &mut Option<String>, field: &mut Option<Field>, text: &str) {
    let target = match (exception, field) {
        (Some(exception), _) => exception,
        (None, Some(field)) if !field.skip => &mut field.text,
        _ => return,
    };
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text.trim());
}

/// Feature type names advertised by a WFS GetCapabilities document, in order.
pub fn capabilities_type_names(body: &str) -> Result<Vec<String>, Failure> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut res = vec![];
    let mut root_seen = false;
    let mut in_feature_type = false;
    let mut in_name = false;
    let mut exception: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Failure::Capabilities(e.to_string()))?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !root_seen {
                    root_seen = true;
                    if is_exception_root(&name) {
                        exception = Some(String::new());
                    }
                }
                match name.as_str() {
                    "FeatureType" => in_feature_type = true,
                    "Name" if in_feature_type => in_name = true,
                    _ => {}
                }
            }
            Event::Text(e) if in_name || exception.is_some() => {
                let text = e
                    .unescape()
                    .map_err(|e| Failure::Capabilities(e.to_string()))?;
                match exception.as_mut() {
                    Some(exception) => {
                        if !exception.is_empty() {
                            exception.push(' ');
                        }
                        exception.push_str(text.trim());
                    }
                    None => res.push(text.trim().to_string()),
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"FeatureType" => {
                    in_feature_type = false;
                    in_name = false;
                }
                b"Name" => in_name = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(exception) = exception {
        return Err(Failure::Capabilities(format!(
            "Service reported an error: {exception}"
        )));
    }
    if !root_seen {
        return Err(Failure::Capabilities("Response is not an XML document".into()));
    }
    Ok(res)
}
