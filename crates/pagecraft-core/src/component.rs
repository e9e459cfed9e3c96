//! Components placed on the page canvas.
//!
//! A component is a flat record: geometry in canvas units plus presentation
//! and content fields. Its JSON shape (camelCase, `type` for the kind) is the
//! interchange format used by import, export and persistence.

use kurbo::{Point, Rect};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for components.
pub type ComponentId = Uuid;

/// Smallest width or height an interactive resize can produce.
pub const MIN_COMPONENT_SIZE: f64 = 20.0;

/// Where newly added components are placed.
pub const DEFAULT_POSITION: Point = Point::new(50.0, 50.0);

/// The kind of form element a component renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Text,
    Input,
    Textarea,
    Checkbox,
    Radio,
    Dropdown,
    FileAttachment,
    FileUpload,
    Section,
    Title,
    Introduction,
    Matrix,
    Rating,
}

impl ComponentKind {
    /// Every kind, in palette order.
    pub const ALL: [ComponentKind; 13] = [
        ComponentKind::Text,
        ComponentKind::Input,
        ComponentKind::Textarea,
        ComponentKind::Checkbox,
        ComponentKind::Radio,
        ComponentKind::Dropdown,
        ComponentKind::FileAttachment,
        ComponentKind::FileUpload,
        ComponentKind::Section,
        ComponentKind::Title,
        ComponentKind::Introduction,
        ComponentKind::Matrix,
        ComponentKind::Rating,
    ];

    /// Interchange name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Text => "text",
            ComponentKind::Input => "input",
            ComponentKind::Textarea => "textarea",
            ComponentKind::Checkbox => "checkbox",
            ComponentKind::Radio => "radio",
            ComponentKind::Dropdown => "dropdown",
            ComponentKind::FileAttachment => "fileAttachment",
            ComponentKind::FileUpload => "fileUpload",
            ComponentKind::Section => "section",
            ComponentKind::Title => "title",
            ComponentKind::Introduction => "introduction",
            ComponentKind::Matrix => "matrix",
            ComponentKind::Rating => "rating",
        }
    }

    /// Default label, e.g. "Checkbox Component".
    pub fn default_label(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Component", first.to_ascii_uppercase(), chars.as_str()),
            None => String::from("Component"),
        }
    }

    /// Default (width, height) for a freshly added component.
    pub fn default_size(self) -> (f64, f64) {
        let width = match self {
            ComponentKind::Section | ComponentKind::Title | ComponentKind::Introduction => 400.0,
            _ => 200.0,
        };
        let height = match self {
            ComponentKind::Textarea | ComponentKind::Matrix | ComponentKind::Section => 150.0,
            _ => 100.0,
        };
        (width, height)
    }

    /// Whether the kind carries a list of choices.
    pub fn has_options(self) -> bool {
        matches!(
            self,
            ComponentKind::Checkbox | ComponentKind::Radio | ComponentKind::Dropdown
        )
    }

    /// Whether the kind carries rows and columns.
    pub fn is_matrix(self) -> bool {
        self == ComponentKind::Matrix
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown component type: {}", s))
    }
}

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Leading coordinate (x or y) of a component on this axis.
    pub fn position(self, component: &Component) -> f64 {
        match self {
            Axis::X => component.x,
            Axis::Y => component.y,
        }
    }

    /// Extent (width or height) of a component on this axis.
    pub fn size(self, component: &Component) -> f64 {
        match self {
            Axis::X => component.width,
            Axis::Y => component.height,
        }
    }

    pub(crate) fn set_position(self, component: &mut Component, value: f64) {
        match self {
            Axis::X => component.x = value,
            Axis::Y => component.y = value,
        }
    }
}

fn default_font_size() -> f64 {
    16.0
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_bg_color() -> String {
    "#FFFFFF".to_string()
}

/// Accepts an array of strings; anything else (numbers, null, mixed arrays)
/// degrades to the string entries it contains.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// A rectangular element placed on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub(crate) id: ComponentId,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub label: String,
    /// Left edge in canvas units.
    pub x: f64,
    /// Top edge in canvas units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
    #[serde(default)]
    pub required: bool,
    /// Locked components refuse drag and resize gestures.
    #[serde(default)]
    pub locked: bool,
    #[serde(default, deserialize_with = "string_list")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub rows: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_file_types: Option<String>,
    /// Maximum upload size in MB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
}

impl Component {
    /// Create a component of the given kind with its default content and geometry.
    pub fn new(kind: ComponentKind) -> Self {
        let (width, height) = kind.default_size();
        let (options, rows, columns) = if kind.is_matrix() {
            (
                Vec::new(),
                vec!["Row 1".to_string(), "Row 2".to_string()],
                vec!["Column 1".to_string(), "Column 2".to_string()],
            )
        } else if kind.has_options() {
            (
                vec!["Option 1".to_string(), "Option 2".to_string()],
                Vec::new(),
                Vec::new(),
            )
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        Self {
            id: Uuid::new_v4(),
            kind,
            label: kind.default_label(),
            x: DEFAULT_POSITION.x,
            y: DEFAULT_POSITION.y,
            width,
            height,
            font_size: default_font_size(),
            font_family: default_font_family(),
            color: default_color(),
            bg_color: default_bg_color(),
            required: false,
            locked: false,
            options,
            rows,
            columns,
            description: matches!(kind, ComponentKind::Section | ComponentKind::Introduction)
                .then(|| "Description...".to_string()),
            src: (kind == ComponentKind::FileAttachment).then(String::new),
            max_rating: (kind == ComponentKind::Rating).then_some(5),
            accepted_file_types: (kind == ComponentKind::FileUpload)
                .then(|| ".pdf,.doc,.docx,.jpg,.png".to_string()),
            max_file_size: (kind == ComponentKind::FileUpload).then_some(5.0),
            placeholder: None,
            text: None,
            font_weight: None,
        }
    }

    /// Create a component with explicit geometry.
    pub fn with_geometry(kind: ComponentKind, position: Point, width: f64, height: f64) -> Self {
        let mut component = Self::new(kind);
        component.x = position.x;
        component.y = position.y;
        component.width = width;
        component.height = height;
        component
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Copy of this component under a fresh id.
    pub(crate) fn clone_with_new_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Finite coordinates and a strictly positive size.
    pub fn has_valid_geometry(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Merge a patch into this component.
    ///
    /// Non-finite geometry values are dropped and sizes are clamped to
    /// [`MIN_COMPONENT_SIZE`], so the geometry invariants survive any patch.
    pub fn apply(&mut self, patch: &ComponentPatch) {
        let id = self.id;
        let finite = |name: &str, value: Option<f64>| {
            let value = value?;
            if value.is_finite() {
                Some(value)
            } else {
                log::warn!("Ignoring non-finite {} in patch for {}", name, id);
                None
            }
        };

        if let Some(x) = finite("x", patch.x) {
            self.x = x;
        }
        if let Some(y) = finite("y", patch.y) {
            self.y = y;
        }
        if let Some(width) = finite("width", patch.width) {
            self.width = width.max(MIN_COMPONENT_SIZE);
        }
        if let Some(height) = finite("height", patch.height) {
            self.height = height.max(MIN_COMPONENT_SIZE);
        }
        if let Some(font_size) = patch.font_size.filter(|v| v.is_finite() && *v > 0.0) {
            self.font_size = font_size;
        }

        if let Some(label) = &patch.label {
            self.label.clone_from(label);
        }
        if let Some(font_family) = &patch.font_family {
            self.font_family.clone_from(font_family);
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(bg_color) = &patch.bg_color {
            self.bg_color.clone_from(bg_color);
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(options) = &patch.options {
            self.options.clone_from(options);
        }
        if let Some(rows) = &patch.rows {
            self.rows.clone_from(rows);
        }
        if let Some(columns) = &patch.columns {
            self.columns.clone_from(columns);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(src) = &patch.src {
            self.src = Some(src.clone());
        }
        if let Some(max_rating) = patch.max_rating {
            self.max_rating = Some(max_rating);
        }
        if let Some(types) = &patch.accepted_file_types {
            self.accepted_file_types = Some(types.clone());
        }
        if let Some(size) = patch.max_file_size.filter(|v| v.is_finite()) {
            self.max_file_size = Some(size);
        }
        if let Some(placeholder) = &patch.placeholder {
            self.placeholder = Some(placeholder.clone());
        }
        if let Some(text) = &patch.text {
            self.text = Some(text.clone());
        }
        if let Some(font_weight) = &patch.font_weight {
            self.font_weight = Some(font_weight.clone());
        }
    }
}

/// A partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub label: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub color: Option<String>,
    pub bg_color: Option<String>,
    pub required: Option<bool>,
    pub locked: Option<bool>,
    pub options: Option<Vec<String>>,
    pub rows: Option<Vec<String>>,
    pub columns: Option<Vec<String>>,
    pub description: Option<String>,
    pub src: Option<String>,
    pub max_rating: Option<u32>,
    pub accepted_file_types: Option<String>,
    pub max_file_size: Option<f64>,
    pub placeholder: Option<String>,
    pub text: Option<String>,
    pub font_weight: Option<String>,
}

impl ComponentPatch {
    /// Patch that moves a component.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that resizes a component.
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Patch that relabels a component.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}
