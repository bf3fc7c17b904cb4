//! Atom catalog
//!
//! The fixed set of atoms and the wire shape each one returns. The shapes
//! are a compatibility contract with existing atom builds and are kept
//! per atom rather than unified.

use super::scripts;

/// How an atom's raw output must be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"status","value"}` serialized once
    Envelope,
    /// An envelope whose `value` is itself a serialized envelope
    NestedEnvelope,
    /// A bare JSON value with no envelope
    Bare,
}

/// Named automation atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Atom {
    IsDisplayed,
    IsEnabled,
    GetLocation,
    GetLocationInView,
    GetSize,
    GetName,
    GetAttributeValue,
    GetText,
    Equals,
    Submit,
    Click,
    IsSelected,
    Clear,
    GetValueOfCssProperty,
    IsFileInput,
    IsContentEditable,
    Type,
    ScrollIntoView,
    FindElement,
    FindElements,
    MarkUploadTarget,
}

impl Atom {
    /// Every atom in the catalog
    pub const ALL: [Atom; 21] = [
        Atom::IsDisplayed,
        Atom::IsEnabled,
        Atom::GetLocation,
        Atom::GetLocationInView,
        Atom::GetSize,
        Atom::GetName,
        Atom::GetAttributeValue,
        Atom::GetText,
        Atom::Equals,
        Atom::Submit,
        Atom::Click,
        Atom::IsSelected,
        Atom::Clear,
        Atom::GetValueOfCssProperty,
        Atom::IsFileInput,
        Atom::IsContentEditable,
        Atom::Type,
        Atom::ScrollIntoView,
        Atom::FindElement,
        Atom::FindElements,
        Atom::MarkUploadTarget,
    ];

    /// Catalog name
    pub fn name(self) -> &'static str {
        match self {
            Atom::IsDisplayed => "is_displayed",
            Atom::IsEnabled => "is_enabled",
            Atom::GetLocation => "get_location",
            Atom::GetLocationInView => "get_location_in_view",
            Atom::GetSize => "get_size",
            Atom::GetName => "get_name",
            Atom::GetAttributeValue => "get_attribute_value",
            Atom::GetText => "get_text",
            Atom::Equals => "equals",
            Atom::Submit => "submit",
            Atom::Click => "click",
            Atom::IsSelected => "is_selected",
            Atom::Clear => "clear",
            Atom::GetValueOfCssProperty => "get_value_of_css_property",
            Atom::IsFileInput => "is_file_input",
            Atom::IsContentEditable => "is_content_editable",
            Atom::Type => "type",
            Atom::ScrollIntoView => "scroll_into_view",
            Atom::FindElement => "find_element",
            Atom::FindElements => "find_elements",
            Atom::MarkUploadTarget => "mark_upload_target",
        }
    }

    /// Look up an atom by catalog name
    pub fn from_name(name: &str) -> Option<Atom> {
        Atom::ALL.iter().copied().find(|atom| atom.name() == name)
    }

    /// Response shape contract for this atom
    pub fn shape(self) -> ResponseShape {
        match self {
            Atom::GetSize | Atom::GetLocationInView => ResponseShape::NestedEnvelope,
            Atom::IsFileInput | Atom::IsContentEditable | Atom::MarkUploadTarget => ResponseShape::Bare,
            _ => ResponseShape::Envelope,
        }
    }

    /// JavaScript function source
    pub fn source(self) -> &'static str {
        match self {
            Atom::IsDisplayed => scripts::IS_DISPLAYED,
            Atom::IsEnabled => scripts::IS_ENABLED,
            Atom::GetLocation => scripts::GET_LOCATION,
            Atom::GetLocationInView => scripts::GET_LOCATION_IN_VIEW,
            Atom::GetSize => scripts::GET_SIZE,
            Atom::GetName => scripts::GET_NAME,
            Atom::GetAttributeValue => scripts::GET_ATTRIBUTE_VALUE,
            Atom::GetText => scripts::GET_TEXT,
            Atom::Equals => scripts::EQUALS,
            Atom::Submit => scripts::SUBMIT,
            Atom::Click => scripts::CLICK,
            Atom::IsSelected => scripts::IS_SELECTED,
            Atom::Clear => scripts::CLEAR,
            Atom::GetValueOfCssProperty => scripts::GET_VALUE_OF_CSS_PROPERTY,
            Atom::IsFileInput => scripts::IS_FILE_INPUT,
            Atom::IsContentEditable => scripts::IS_CONTENT_EDITABLE,
            Atom::Type => scripts::TYPE,
            Atom::ScrollIntoView => scripts::SCROLL_INTO_VIEW,
            Atom::FindElement => scripts::FIND_ELEMENT,
            Atom::FindElements => scripts::FIND_ELEMENTS,
            Atom::MarkUploadTarget => scripts::MARK_UPLOAD_TARGET,
        }
    }
}
