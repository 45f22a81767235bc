//! Interprets a normalized response: vendor errors and the action envelope.

use crate::api::error::ApiError;
use crate::api::tree::ResponseTree;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Where the API puts application-level errors.
pub const ERROR_PATH: [&str; 3] = ["Response", "Errors", "Error"];

/// Suffix of the element wrapping an action's payload (`DescribeRegionsResponse`).
pub const ENVELOPE_SUFFIX: &str = "Response";

/// Application-level error reported inside a successful HTTP exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorError {
    #[serde(rename = "Code", alias = "code", default)]
    pub code: String,
    #[serde(rename = "ErrorNo", alias = "errorNo", default)]
    pub error_no: String,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: String,
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for VendorError {}

impl VendorError {
    /// Extracts the error at `Response.Errors.Error`, if it carries a code.
    ///
    /// A repeated `Error` element yields the first one. Fields that are not
    /// plain text are kept as their JSON rendering, so a present code is
    /// never lost to an oddly shaped sibling.
    pub fn from_tree(tree: &ResponseTree) -> Option<Self> {
        let node = tree.get_path(&ERROR_PATH)?;
        let node = match node {
            ResponseTree::Array(items) => items.first()?,
            other => other,
        };

        let code = field_text(node, &["Code", "code"]);
        if code.is_empty() {
            debug!("Error element without a code: {}", node.to_json());
            return None;
        }

        Some(VendorError {
            code,
            error_no: field_text(node, &["ErrorNo", "errorNo"]),
            message: field_text(node, &["Message", "message"]),
        })
    }
}

/// Text of the first present field in `names`; non-text nodes render as JSON.
fn field_text(node: &ResponseTree, names: &[&str]) -> String {
    match names.iter().find_map(|name| node.get(name)) {
        Some(ResponseTree::Text(text)) => text.clone(),
        Some(other) => other.to_json(),
        None => String::new(),
    }
}

/// Turns a normalized tree into the payload for `action`.
///
/// A vendor error wins over everything else. Otherwise the
/// `<action>Response` envelope is unwrapped when present.
pub fn interpret(action: &str, mut tree: ResponseTree) -> Result<ResponseTree, ApiError> {
    if let Some(err) = VendorError::from_tree(&tree) {
        return Err(ApiError::Vendor(err));
    }

    let envelope = format!("{action}{ENVELOPE_SUFFIX}");
    match tree.take(&envelope) {
        Some(payload) => Ok(payload),
        None => Ok(tree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::normalize::normalize;

    fn tree(xml: &str) -> ResponseTree {
        normalize(ResponseTree::from_xml(xml).unwrap())
    }

    const ERROR_XML: &str = r#"
        <Response>
            <Errors>
                <Error>
                    <Code>InvalidParameterValue</Code>
                    <ErrorNo>4001</ErrorNo>
                    <Message>Value (abc) for parameter instanceId is invalid</Message>
                </Error>
            </Errors>
            <RequestID>req-9</RequestID>
        </Response>"#;

    #[test]
    fn test_vendor_error_detected() {
        let err = interpret("DescribeInstances", tree(ERROR_XML)).unwrap_err();
        let vendor = err.vendor().unwrap();
        assert_eq!(vendor.code, "InvalidParameterValue");
        assert_eq!(vendor.error_no, "4001");
        assert!(vendor.message.contains("instanceId"));
    }

    #[test]
    fn test_vendor_error_message_is_serialized_error() {
        let err = interpret("DescribeInstances", tree(ERROR_XML)).unwrap_err();
        let text = err.to_string();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["Code"], "InvalidParameterValue");
        assert_eq!(parsed["ErrorNo"], "4001");
    }

    #[test]
    fn test_vendor_error_wins_over_envelope() {
        let xml = r#"
            <Response>
                <Errors><Error><Code>AuthFailure</Code></Error></Errors>
                <DescribeRegionsResponse><regionInfo/></DescribeRegionsResponse>
            </Response>"#;
        let err = interpret("DescribeRegions", tree(xml)).unwrap_err();
        assert_eq!(err.vendor().map(|v| v.code.as_str()), Some("AuthFailure"));
    }

    #[test]
    fn test_empty_code_is_not_an_error() {
        let xml = "<Response><Errors><Error><Code></Code><Message>x</Message></Error></Errors></Response>";
        let result = interpret("DescribeRegions", tree(xml)).unwrap();
        assert!(result.contains("Response"));
    }

    #[test]
    fn test_lower_camel_error_fields() {
        let xml = "<Response><Errors><Error><code>Denied</code><errorNo>7</errorNo></Error></Errors></Response>";
        let vendor = VendorError::from_tree(&tree(xml)).unwrap();
        assert_eq!(vendor.code, "Denied");
        assert_eq!(vendor.error_no, "7");
        assert!(vendor.message.is_empty());
    }

    #[test]
    fn test_code_survives_structured_message() {
        let xml = "<Response><Errors><Error><Code>Denied</Code><Message>bad <b>x</b></Message></Error></Errors></Response>";
        let err = interpret("DescribeRegions", tree(xml)).unwrap_err();

        let vendor = err.vendor().unwrap();
        assert_eq!(vendor.code, "Denied");
        let message: serde_json::Value = serde_json::from_str(&vendor.message).unwrap();
        assert_eq!(message["#content"], "bad");
        assert_eq!(message["b"], "x");
    }

    #[test]
    fn test_structured_error_number_kept_as_json() {
        let xml = "<Response><Errors><Error><Code>E</Code><ErrorNo><major>4</major></ErrorNo></Error></Errors></Response>";
        let vendor = VendorError::from_tree(&tree(xml)).unwrap();
        assert_eq!(vendor.error_no, r#"{"major":"4"}"#);
    }

    #[test]
    fn test_first_of_repeated_errors() {
        let xml = "<Response><Errors><Error><Code>A</Code></Error><Error><Code>B</Code></Error></Errors></Response>";
        let vendor = VendorError::from_tree(&tree(xml)).unwrap();
        assert_eq!(vendor.code, "A");
    }

    #[test]
    fn test_envelope_unwrapped() {
        let xml = r#"
            <DescribeRegionsResponse>
                <requestId>r1</requestId>
                <regionInfo><item><regionId>cn-1</regionId></item></regionInfo>
            </DescribeRegionsResponse>"#;
        let payload = interpret("DescribeRegions", tree(xml)).unwrap();
        assert_eq!(payload.get("requestId").and_then(|t| t.as_str()), Some("r1"));
        assert_eq!(payload.get("regionInfo").and_then(|t| t.as_array()).map(|a| a.len()), Some(1));
        assert!(!payload.contains("DescribeRegionsResponse"));
    }

    #[test]
    fn test_unwrapped_payload_returned_as_is() {
        let xml = "<Result><Value>1</Value></Result>";
        let payload = interpret("GetThing", tree(xml)).unwrap();
        assert_eq!(payload.get_path(&["Result", "Value"]).and_then(|t| t.as_str()), Some("1"));
    }

    #[test]
    fn test_envelope_for_other_action_not_unwrapped() {
        let xml = "<DescribeZonesResponse><a>1</a></DescribeZonesResponse>";
        let payload = interpret("DescribeRegions", tree(xml)).unwrap();
        assert!(payload.contains("DescribeZonesResponse"));
    }
}
