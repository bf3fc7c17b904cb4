//! Element locator
//!
//! Finds elements by WebDriver strategy, either below an element or from
//! the document root, through the locator atoms.

use serde_json::Value;
use std::fmt;
use tracing::{debug, instrument};

use super::status::WebDriverStatus;
use super::wire::{AtomResult, CommandRequest, ElementReference};
use crate::atoms::{Atom, AtomInvoker};
use crate::error::{Error, Result};

/// WebDriver locator strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    CssSelector,
    ClassName,
    Id,
    Name,
    TagName,
    LinkText,
    PartialLinkText,
    XPath,
}

impl LocatorStrategy {
    /// Parse a wire strategy name
    pub fn parse(using: &str) -> Option<Self> {
        match using {
            "css selector" => Some(LocatorStrategy::CssSelector),
            "class name" => Some(LocatorStrategy::ClassName),
            "id" => Some(LocatorStrategy::Id),
            "name" => Some(LocatorStrategy::Name),
            "tag name" => Some(LocatorStrategy::TagName),
            "link text" => Some(LocatorStrategy::LinkText),
            "partial link text" => Some(LocatorStrategy::PartialLinkText),
            "xpath" => Some(LocatorStrategy::XPath),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LocatorStrategy::CssSelector => "css selector",
            LocatorStrategy::ClassName => "class name",
            LocatorStrategy::Id => "id",
            LocatorStrategy::Name => "name",
            LocatorStrategy::TagName => "tag name",
            LocatorStrategy::LinkText => "link text",
            LocatorStrategy::PartialLinkText => "partial link text",
            LocatorStrategy::XPath => "xpath",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy and value read from an `element`/`elements` body
#[derive(Debug, Clone, PartialEq)]
pub struct LocatorQuery {
    pub using: String,
    pub value: String,
}

impl LocatorQuery {
    /// Read `using` and `value` from the request body
    pub fn from_request(request: &CommandRequest) -> Result<Self> {
        let using = request
            .body_str("using")
            .ok_or_else(|| Error::missing_command_parameter("using"))?;
        let value = request
            .body_str("value")
            .ok_or_else(|| Error::missing_command_parameter("value"))?;

        Ok(Self {
            using: using.to_string(),
            value: value.to_string(),
        })
    }
}

/// Locate one element, or every matching element when `many` is set
///
/// `root` scopes the search below an element; `None` searches the whole
/// document.
#[instrument(skip(invoker))]
pub async fn locate(
    invoker: &AtomInvoker,
    query: &LocatorQuery,
    root: Option<&ElementReference>,
    many: bool,
) -> Result<AtomResult> {
    let strategy = match LocatorStrategy::parse(&query.using) {
        Some(strategy) => strategy,
        None => {
            return Ok(AtomResult::failure(
                WebDriverStatus::InvalidSelector,
                format!("Unsupported locator strategy: {}", query.using),
            ))
        }
    };

    debug!("Locating {} '{}' below {:?}", strategy, query.value, root);

    let root = root.map(|r| r.to_json()).unwrap_or(Value::Null);
    let args = [
        Value::String(strategy.as_str().to_string()),
        Value::String(query.value.clone()),
        root,
    ];
    let atom = if many { Atom::FindElements } else { Atom::FindElement };

    invoker.invoke(atom, &args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::MockPage;
    use crate::webdriver::wire::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_strategy_names() {
        for name in [
            "css selector",
            "class name",
            "id",
            "name",
            "tag name",
            "link text",
            "partial link text",
            "xpath",
        ] {
            assert_eq!(LocatorStrategy::parse(name).unwrap().as_str(), name);
        }
        assert_eq!(LocatorStrategy::parse("css"), None);
    }

    #[test]
    fn test_query_requires_using_and_value() {
        let missing_using = CommandRequest::new(HttpMethod::Post, "element", Some(json!({"value": "a"})));
        assert!(matches!(
            LocatorQuery::from_request(&missing_using),
            Err(Error::MissingCommandParameter(_))
        ));

        let no_body = CommandRequest::new(HttpMethod::Post, "element", None);
        assert!(LocatorQuery::from_request(&no_body).is_err());
    }

    #[tokio::test]
    async fn test_unsupported_strategy_is_invalid_selector() {
        let page = Arc::new(MockPage::new());
        let invoker = AtomInvoker::new(page.clone());
        let query = LocatorQuery {
            using: "sizzle".to_string(),
            value: "a".to_string(),
        };

        let result = locate(&invoker, &query, None, false).await.unwrap();
        assert_eq!(result.status, 32);
        assert!(page.atom_calls().is_empty());
    }

    #[tokio::test]
    async fn test_locate_passes_root() {
        let page = Arc::new(MockPage::new());
        page.respond(Atom::FindElements, json!([{"ELEMENT": ":wdc:2"}]));
        let invoker = AtomInvoker::new(page.clone());
        let query = LocatorQuery {
            using: "tag name".to_string(),
            value: "li".to_string(),
        };

        let root = ElementReference::new(":wdc:1");
        let result = locate(&invoker, &query, Some(&root), true).await.unwrap();

        assert_eq!(result.value, json!([{"ELEMENT": ":wdc:2"}]));
        assert!(page.scripts()[0].contains(r#"["tag name","li",{"ELEMENT":":wdc:1"}]"#));
    }
}
