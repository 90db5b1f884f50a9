//! Namespaces, control names and attribute values.

use tessera_layout::ContainerType;

/// `android:` attribute prefix.
pub const ANDROID: &str = "android";
/// `app:` attribute prefix.
pub const APP: &str = "app";

/// Fill the parent.
pub const MATCH_PARENT: &str = "match_parent";
/// Size to content.
pub const WRAP_CONTENT: &str = "wrap_content";
/// Size from constraints or weight.
pub const MATCH_CONSTRAINT: &str = "0dp";
/// Anchor target for the parent in constraint attributes.
pub const PARENT: &str = "parent";

/// `ConstraintLayout`
pub const CONSTRAINT_LAYOUT: &str = "androidx.constraintlayout.widget.ConstraintLayout";
/// `RelativeLayout`
pub const RELATIVE_LAYOUT: &str = "RelativeLayout";
/// `LinearLayout`
pub const LINEAR_LAYOUT: &str = "LinearLayout";
/// `GridLayout`
pub const GRID_LAYOUT: &str = "GridLayout";
/// `FrameLayout`
pub const FRAME_LAYOUT: &str = "FrameLayout";
/// `RadioGroup`
pub const RADIO_GROUP: &str = "RadioGroup";
/// `TextView`
pub const TEXT_VIEW: &str = "TextView";
/// `ImageView`
pub const IMAGE_VIEW: &str = "ImageView";
/// `ImageButton`
pub const IMAGE_BUTTON: &str = "ImageButton";
/// `EditText`
pub const EDIT_TEXT: &str = "EditText";
/// `Button`
pub const BUTTON: &str = "Button";
/// `CheckBox`
pub const CHECKBOX: &str = "CheckBox";
/// `RadioButton`
pub const RADIO_BUTTON: &str = "RadioButton";
/// `Spinner`
pub const SPINNER: &str = "Spinner";
/// `SeekBar`
pub const SEEK_BAR: &str = "SeekBar";
/// `View`
pub const VIEW: &str = "View";
/// `Space`
pub const SPACE: &str = "Space";
/// `WebView`
pub const WEB_VIEW: &str = "WebView";

/// Control emitted for a container type.
#[must_use]
pub fn control_name(container: ContainerType) -> &'static str {
    match container {
        ContainerType::Constraint => CONSTRAINT_LAYOUT,
        ContainerType::Relative => RELATIVE_LAYOUT,
        ContainerType::Linear => LINEAR_LAYOUT,
        ContainerType::Grid => GRID_LAYOUT,
        ContainerType::Frame => FRAME_LAYOUT,
        ContainerType::RadioGroup => RADIO_GROUP,
        ContainerType::Text => TEXT_VIEW,
        ContainerType::Image => IMAGE_VIEW,
        ContainerType::Edit => EDIT_TEXT,
        ContainerType::Button => BUTTON,
        ContainerType::Checkbox => CHECKBOX,
        ContainerType::Radio => RADIO_BUTTON,
        ContainerType::Select => SPINNER,
        ContainerType::Range => SEEK_BAR,
        ContainerType::Space => SPACE,
        ContainerType::Web => WEB_VIEW,
        ContainerType::Line | ContainerType::Unknown => VIEW,
    }
}

/// `android:inputType` for an `<input>` type or `textarea`.
#[must_use]
pub fn input_type(kind: &str) -> &'static str {
    match kind {
        "email" => "textEmailAddress",
        "password" => "textPassword",
        "number" => "number",
        "tel" => "phone",
        "url" => "textUri",
        "date" => "date",
        "time" => "time",
        "datetime-local" => "datetime",
        "textarea" => "textMultiLine",
        _ => "text",
    }
}

/// `android:scaleType` for a CSS `object-fit` or `background-size` value.
#[must_use]
pub fn scale_type(fit: &str) -> &'static str {
    match fit {
        "cover" => "centerCrop",
        "contain" => "fitCenter",
        "none" => "center",
        "scale-down" => "centerInside",
        _ => "fitXY",
    }
}
