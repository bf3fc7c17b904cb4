//! Element command router
//!
//! Maps `(method, path suffix, first segment)` onto exactly one element
//! operation.

use super::wire::{CommandRequest, HttpMethod};
use crate::error::{Error, Result};

/// Element-scoped operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementCommand {
    /// `POST element`
    FindChild,
    /// `POST elements`
    FindChildren,
    /// `POST value`
    SendKeys,
    /// `POST submit`
    Submit,
    /// `GET displayed`
    IsDisplayed,
    /// `GET enabled`
    IsEnabled,
    /// `GET name`
    TagName,
    /// `POST click`
    Click,
    /// `GET selected`
    IsSelected,
    /// `POST clear`
    Clear,
    /// `GET text`
    Text,
    /// `GET location`
    Location,
    /// `GET location_in_view`
    LocationInView,
    /// `GET size`
    Size,
    /// `GET ""`
    Handle,
    /// `GET attribute/:name`
    Attribute(String),
    /// `GET css/:propertyName`
    Css(String),
    /// `GET equals/:otherElementId`
    Equals(String),
}

impl ElementCommand {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ElementCommand::FindChild => "element",
            ElementCommand::FindChildren => "elements",
            ElementCommand::SendKeys => "value",
            ElementCommand::Submit => "submit",
            ElementCommand::IsDisplayed => "displayed",
            ElementCommand::IsEnabled => "enabled",
            ElementCommand::TagName => "name",
            ElementCommand::Click => "click",
            ElementCommand::IsSelected => "selected",
            ElementCommand::Clear => "clear",
            ElementCommand::Text => "text",
            ElementCommand::Location => "location",
            ElementCommand::LocationInView => "location_in_view",
            ElementCommand::Size => "size",
            ElementCommand::Handle => "",
            ElementCommand::Attribute(_) => "attribute",
            ElementCommand::Css(_) => "css",
            ElementCommand::Equals(_) => "equals",
        }
    }
}

/// Select the operation for a method, full suffix and first segment
///
/// `parameter` is the remainder after the first segment and is only
/// consulted for the prefix routes.
pub fn route(method: HttpMethod, path_suffix: &str, first_segment: &str, parameter: &str) -> Result<ElementCommand> {
    let exact = match (method, path_suffix) {
        (HttpMethod::Post, "element") => Some(ElementCommand::FindChild),
        (HttpMethod::Post, "elements") => Some(ElementCommand::FindChildren),
        (HttpMethod::Post, "value") => Some(ElementCommand::SendKeys),
        (HttpMethod::Post, "submit") => Some(ElementCommand::Submit),
        (HttpMethod::Get, "displayed") => Some(ElementCommand::IsDisplayed),
        (HttpMethod::Get, "enabled") => Some(ElementCommand::IsEnabled),
        (HttpMethod::Get, "name") => Some(ElementCommand::TagName),
        (HttpMethod::Post, "click") => Some(ElementCommand::Click),
        (HttpMethod::Get, "selected") => Some(ElementCommand::IsSelected),
        (HttpMethod::Post, "clear") => Some(ElementCommand::Clear),
        (HttpMethod::Get, "text") => Some(ElementCommand::Text),
        (HttpMethod::Get, "location") => Some(ElementCommand::Location),
        (HttpMethod::Get, "location_in_view") => Some(ElementCommand::LocationInView),
        (HttpMethod::Get, "size") => Some(ElementCommand::Size),
        (HttpMethod::Get, "") => Some(ElementCommand::Handle),
        _ => None,
    };

    if let Some(command) = exact {
        return Ok(command);
    }

    if method == HttpMethod::Get {
        let prefixed: Option<fn(String) -> ElementCommand> = match first_segment {
            "attribute" => Some(ElementCommand::Attribute),
            "css" => Some(ElementCommand::Css),
            "equals" => Some(ElementCommand::Equals),
            _ => None,
        };

        if let Some(ctor) = prefixed {
            if parameter.is_empty() {
                return Err(Error::missing_command_parameter(format!(
                    "{} requires a path parameter",
                    first_segment
                )));
            }
            return Ok(ctor(parameter.to_string()));
        }
    }

    Err(Error::invalid_command_method(format!(
        "{} {}",
        method, path_suffix
    )))
}

/// Route a parsed request
pub fn route_request(req: &CommandRequest) -> Result<ElementCommand> {
    route(req.method, &req.path_suffix, req.first_segment(), &req.parameter())
}
