//! Margins, padding and translations from the adjusted box values.

use tessera_layout::{Attributes, BoxRegion, ContainerType, EdgeSizes, NodeTree, ResourceStore};

use super::TRANSLATION;
use crate::constants::{ANDROID, APP};
use crate::settings::{API_OREO, API_RTL, AndroidSettings};

/// Values below this are written as nothing.
const EPSILON: f32 = 0.01;

pub(super) fn apply(tree: &mut NodeTree, settings: &AndroidSettings, resources: &mut ResourceStore) {
    for id in tree.render_order() {
        let Some(parent) = tree.render_parent(id) else {
            continue;
        };
        let edges = |first: BoxRegion, second: BoxRegion, third: BoxRegion, fourth: BoxRegion| EdgeSizes {
            top: tree.box_value(id, first),
            right: tree.box_value(id, second),
            bottom: tree.box_value(id, third),
            left: tree.box_value(id, fourth),
        };
        let [mt, mr, mb, ml] = BoxRegion::MARGIN;
        let [pt, pr, pb, pl] = BoxRegion::PADDING;
        let mut margin = edges(mt, mr, mb, ml);
        let mut padding = edges(pt, pr, pb, pl);
        let node = &tree[id];
        let border = node.box_model().border;
        padding.top += border.top;
        padding.right += border.right;
        padding.bottom += border.bottom;
        padding.left += border.left;

        let (mut dx, mut dy) = node.data.get(TRANSLATION).copied().unwrap_or_default();
        if tree[parent].container_type == ContainerType::Constraint {
            // ConstraintLayout ignores negative margins.
            let anchored = |name: &str| node.attributes.get(APP, name) == Some("parent");
            if margin.left < 0.0 {
                dx += margin.left;
                margin.left = 0.0;
            }
            if margin.top < 0.0 {
                dy += margin.top;
                margin.top = 0.0;
            }
            if margin.right < 0.0 {
                if anchored("layout_constraintEnd_toEndOf") {
                    dx -= margin.right;
                }
                margin.right = 0.0;
            }
            if margin.bottom < 0.0 {
                if anchored("layout_constraintBottom_toBottomOf") {
                    dy -= margin.bottom;
                }
                margin.bottom = 0.0;
            }
        }

        let attributes = &mut tree[id].attributes;
        write_edges(attributes, "layout_margin", margin, settings, resources);
        write_edges(attributes, "padding", padding, settings, resources);
        if dx.abs() >= EPSILON {
            attributes.set(ANDROID, "translationX", settings.dp(dx));
        }
        if dy.abs() >= EPSILON {
            attributes.set(ANDROID, "translationY", settings.dp(dy));
        }
    }
}

/// Writes four edges, collapsing equal ones into the shorthand attributes.
fn write_edges(
    attributes: &mut Attributes,
    prefix: &str,
    sizes: EdgeSizes,
    settings: &AndroidSettings,
    resources: &mut ResourceStore,
) {
    let EdgeSizes {
        top,
        right,
        bottom,
        left,
    } = sizes;
    if [top, right, bottom, left].iter().all(|v| v.abs() < EPSILON) {
        return;
    }
    let mut set = |suffix: &str, px: f32| {
        if px.abs() < EPSILON {
            return;
        }
        let name = format!("{prefix}{suffix}");
        let mut value = settings.dp(px);
        if settings.dimension_resources {
            let dimen = resources.add_dimen(&format!("{name}_{value}"), &value);
            value = format!("@dimen/{dimen}");
        }
        attributes.set(ANDROID, &name, value);
    };

    if top == right && right == bottom && bottom == left {
        set("", top);
    } else if settings.supports(API_OREO) && top == bottom && left == right {
        set("Vertical", top);
        set("Horizontal", left);
    } else {
        set("Top", top);
        set("Bottom", bottom);
        set("Start", left);
        set("End", right);
        if !settings.supports(API_RTL) {
            set("Left", left);
            set("Right", right);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(sizes: EdgeSizes, settings: &AndroidSettings) -> Vec<(String, String)> {
        let mut attributes = Attributes::default();
        write_edges(&mut attributes, "padding", sizes, settings, &mut ResourceStore::new());
        attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_equal_edges_collapse() {
        let sizes = EdgeSizes { top: 8.0, right: 8.0, bottom: 8.0, left: 8.0 };
        assert_eq!(written(sizes, &AndroidSettings::default()), vec![pair("android:padding", "8dp")]);
        assert!(written(EdgeSizes::default(), &AndroidSettings::default()).is_empty());
    }

    #[test]
    fn test_legacy_left_right_below_rtl_api() {
        let sizes = EdgeSizes { top: 4.0, right: 0.0, bottom: 0.0, left: 6.0 };
        let settings = AndroidSettings { min_api: 16, ..AndroidSettings::default() };
        assert_eq!(
            written(sizes, &settings),
            vec![
                pair("android:paddingTop", "4dp"),
                pair("android:paddingStart", "6dp"),
                pair("android:paddingLeft", "6dp"),
            ]
        );
    }

    #[test]
    fn test_axis_shorthand_from_oreo() {
        let sizes = EdgeSizes { top: 4.0, right: 10.0, bottom: 4.0, left: 10.0 };
        let settings = AndroidSettings { min_api: 26, ..AndroidSettings::default() };
        assert_eq!(
            written(sizes, &settings),
            vec![pair("android:paddingVertical", "4dp"), pair("android:paddingHorizontal", "10dp")]
        );
    }

    #[test]
    fn test_dimension_resources() {
        let mut resources = ResourceStore::new();
        let mut attributes = Attributes::default();
        let settings = AndroidSettings { dimension_resources: true, ..AndroidSettings::default() };
        let sizes = EdgeSizes { top: 12.0, right: 12.0, bottom: 12.0, left: 12.0 };
        write_edges(&mut attributes, "layout_margin", sizes, &settings, &mut resources);
        assert_eq!(attributes.get("android", "layout_margin"), Some("@dimen/layout_margin_12dp"));
        assert_eq!(resources.dimen("layout_margin_12dp"), Some("12dp"));
    }
}
