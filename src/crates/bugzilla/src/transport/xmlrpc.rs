//! Minimal XML-RPC codec.
//!
//! Requests are written directly as text. Responses are read with
//! `quick-xml` into a small element tree and then interpreted as XML-RPC
//! values. Whitespace inside `<string>` and untyped `<value>` bodies is
//! preserved; Bugzilla whiteboards routinely start with a space.

use crate::error::{BugzillaError, Result};
use base64::Engine;
use chrono::NaiveDateTime;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

/// Serialize a method call with a single parameter.
pub fn encode_call(method: &str, params: &Value) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params>");
    if !params.is_null() {
        xml.push_str("<param>");
        encode_value(params, &mut xml);
        xml.push_str("</param>");
    }
    xml.push_str("</params></methodCall>\n");
    xml
}

fn encode_value(value: &Value, out: &mut String) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str("<boolean>");
            out.push_str(if *b { "1" } else { "0" });
            out.push_str("</boolean>");
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                out.push_str("<int>");
                out.push_str(&i.to_string());
                out.push_str("</int>");
            }
            None => {
                out.push_str("<double>");
                out.push_str(&n.to_string());
                out.push_str("</double>");
            }
        },
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(item, out);
            }
            out.push_str("</data></array>");
        }
        Value::Object(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                encode_value(member, out);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

/// Parse a `methodResponse` body into its single return value.
///
/// A `<fault>` response becomes [`BugzillaError::Fault`].
pub fn decode_response(body: &str) -> Result<Value> {
    let document = parse_tree(body)?;
    let response = document
        .child("methodResponse")
        .ok_or_else(|| invalid("missing <methodResponse>"))?;

    if let Some(fault) = response.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| invalid("fault without a value"))
            .and_then(decode_value)?;
        let code = value.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(BugzillaError::Fault { code, message });
    }

    response
        .child("params")
        .and_then(|params| params.child("param"))
        .and_then(|param| param.child("value"))
        .map(decode_value)
        .unwrap_or(Ok(Value::Null))
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }
}

fn parse_tree(body: &str) -> Result<Element> {
    let mut reader = Reader::from_str(body);
    let mut stack = vec![Element::new(String::new())];

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Element::new(name));
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| invalid("unbalanced end tag"))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| invalid("unbalanced end tag"))?;
                parent.children.push(element);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(document), true) => Ok(document),
        _ => Err(invalid("unclosed element")),
    }
}

fn decode_value(value: &Element) -> Result<Value> {
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text.clone()));
    };

    let text = typed.text.as_str();
    match typed.name.as_str() {
        "string" => Ok(Value::String(text.to_string())),
        "int" | "i4" | "i8" => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(&format!("bad integer {:?}", text))),
        "boolean" => match text.trim() {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(invalid(&format!("bad boolean {:?}", other))),
        },
        "double" => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid(&format!("bad double {:?}", text))),
        "dateTime.iso8601" => Ok(Value::String(normalize_datetime(text.trim()))),
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| invalid(&format!("bad base64: {}", e)))?;
            Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        }
        "nil" => Ok(Value::Null),
        "array" => typed
            .child("data")
            .map(|data| {
                data.children
                    .iter()
                    .filter(|child| child.name == "value")
                    .map(decode_value)
                    .collect::<Result<Vec<_>>>()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        "struct" => {
            let mut members = Map::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| invalid("struct member without a name"))?;
                let value = match member.child("value") {
                    Some(value) => decode_value(value)?,
                    None => Value::Null,
                };
                members.insert(name.text.clone(), value);
            }
            Ok(Value::Object(members))
        }
        other => Err(invalid(&format!("unknown value type <{}>", other))),
    }
}

fn normalize_datetime(text: &str) -> String {
    ["%Y%m%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|parsed| parsed.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| text.to_string())
}

fn invalid(message: &str) -> BugzillaError {
    BugzillaError::Transport(format!("invalid XML-RPC response: {}", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_call() {
        let xml = encode_call("Bug.search", &json!({"product": ["Fedora"], "id": [3450]}));
        assert!(xml.contains("<methodName>Bug.search</methodName>"));
        assert!(xml.contains(
            "<member><name>product</name><value><array><data><value><string>Fedora</string></value></data></array></value></member>"
        ));
        assert!(xml.contains("<int>3450</int>"));
        // member order follows insertion order
        assert!(xml.find("product").unwrap() < xml.find("<name>id</name>").unwrap());
    }

    #[test]
    fn test_encode_escapes_text() {
        let xml = encode_call("Product.get", &json!({"names": ["A & B <c>"]}));
        assert!(xml.contains("A &amp; B &lt;c&gt;"));
    }

    #[test]
    fn test_decode_struct_response() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<methodResponse>
  <params>
    <param>
      <value>
        <struct>
          <member><name>bugs</name><value><array><data>
            <value><struct>
              <member><name>id</name><value><int>307471</int></value></member>
              <member><name>whiteboard</name><value><string> bzcl34nup</string></value></member>
              <member><name>is_open</name><value><boolean>0</boolean></value></member>
              <member><name>creation_time</name><value><dateTime.iso8601>20070926T14:13:00</dateTime.iso8601></value></member>
              <member><name>estimated_time</name><value><double>1.5</double></value></member>
              <member><name>alias</name><value><nil/></value></member>
              <member><name>summary</name><value>untyped &amp; kept</value></member>
            </struct></value>
          </data></array></value></member>
        </struct>
      </value>
    </param>
  </params>
</methodResponse>"#;

        let value = decode_response(body).unwrap();
        let bug = &value["bugs"][0];
        assert_eq!(bug["id"], json!(307471));
        assert_eq!(bug["whiteboard"], json!(" bzcl34nup"));
        assert_eq!(bug["is_open"], json!(false));
        assert_eq!(bug["creation_time"], json!("2007-09-26 14:13:00"));
        assert_eq!(bug["estimated_time"], json!(1.5));
        assert_eq!(bug["alias"], Value::Null);
        assert_eq!(bug["summary"], json!("untyped & kept"));

        let keys: Vec<_> = bug.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys[0], "id");
        assert_eq!(keys[1], "whiteboard");
    }

    #[test]
    fn test_decode_fault() {
        let body = r#"<methodResponse><fault><value><struct>
            <member><name>faultCode</name><value><int>32000</int></value></member>
            <member><name>faultString</name><value><string>Bug #1 does not exist.</string></value></member>
        </struct></value></fault></methodResponse>"#;

        match decode_response(body) {
            Err(BugzillaError::Fault { code, message }) => {
                assert_eq!(code, 32000);
                assert_eq!(message, "Bug #1 does not exist.");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_base64() {
        let body = "<methodResponse><params><param><value><base64>aGVsbG8=</base64></value></param></params></methodResponse>";
        assert_eq!(decode_response(body).unwrap(), json!("hello"));
    }

    #[test]
    fn test_garbage_is_transport_error() {
        let err = decode_response("<html><body>502 Bad Gateway</body></html>").unwrap_err();
        assert!(err.is_remote());

        let err = decode_response("<methodResponse><params>").unwrap_err();
        assert!(err.is_remote());
    }
}
